use bcrypt::{hash, verify};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use tracing::info;

use crate::db::entities::{prelude::User, user};

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("Users must have an email address")]
    MissingEmail,
    #[error("A user with the email '{0}' already exists.")]
    EmailTaken(String),
    #[error("User not found: {0}")]
    NotFound(i32),
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
}

/// Optional profile fields accepted at creation time.
#[derive(Debug, Clone, Default)]
pub struct NewUserFields {
    pub name: String,
}

/// Fields the admin change form may edit.
#[derive(Debug, Clone)]
pub struct UserFlagsUpdate {
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Lowercases the whole address so `Test@GMAIL.com` and `test@gmail.com`
/// are the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Verifies `password` against the stored bcrypt hash.
pub fn check_password(user: &user::Model, password: &str) -> bool {
    verify(password, &user.password_hash).unwrap_or(false)
}

/// The user manager: the only place user rows are created, so every account
/// goes through email normalization and password hashing.
#[derive(Clone)]
pub struct UserStore {
    db: DatabaseConnection,
    hash_cost: u32,
}

impl UserStore {
    pub fn new(db: DatabaseConnection, hash_cost: u32) -> Self {
        Self { db, hash_cost }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn create_user(
        &self,
        email: Option<&str>,
        password: &str,
        fields: NewUserFields,
    ) -> Result<user::Model, UserStoreError> {
        self.insert_user(email, password, fields, false).await
    }

    /// Same validation as `create_user`; the staff and superuser flags are
    /// always set regardless of `fields`.
    pub async fn create_superuser(
        &self,
        email: Option<&str>,
        password: &str,
        fields: NewUserFields,
    ) -> Result<user::Model, UserStoreError> {
        self.insert_user(email, password, fields, true).await
    }

    async fn insert_user(
        &self,
        email: Option<&str>,
        password: &str,
        fields: NewUserFields,
        superuser: bool,
    ) -> Result<user::Model, UserStoreError> {
        let email = match email.map(normalize_email) {
            Some(email) if !email.is_empty() => email,
            _ => return Err(UserStoreError::MissingEmail),
        };

        if self.find_by_email(&email).await?.is_some() {
            return Err(UserStoreError::EmailTaken(email));
        }

        let password_hash = hash(password, self.hash_cost)?;
        let now = Utc::now();
        let new_user = user::ActiveModel {
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            name: Set(fields.name),
            is_active: Set(true),
            is_staff: Set(superuser),
            is_superuser: Set(superuser),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let user = new_user.insert(&self.db).await.map_err(|e| match e.sql_err() {
            // Lost a race against a concurrent registration
            Some(SqlErr::UniqueConstraintViolation(_)) => UserStoreError::EmailTaken(email.clone()),
            _ => UserStoreError::DbErr(e),
        })?;

        info!(user_id = user.id, superuser, "Created user.");
        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<user::Model>, UserStoreError> {
        Ok(User::find_by_id(user_id).one(&self.db).await?)
    }

    /// Looks up a user by email, normalizing the input first.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, UserStoreError> {
        Ok(User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    /// Returns the active user owning `email` when `password` matches.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<user::Model>, UserStoreError> {
        let user = self
            .find_by_email(email)
            .await?
            .filter(|u| u.is_active && check_password(u, password));
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<user::Model>, UserStoreError> {
        Ok(User::find()
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await?)
    }

    /// Updates the caller's own profile; a new password is re-hashed.
    pub async fn update_profile(
        &self,
        user_id: i32,
        name: Option<String>,
        password: Option<&str>,
    ) -> Result<user::Model, UserStoreError> {
        let mut active: user::ActiveModel = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UserStoreError::NotFound(user_id))?
            .into();

        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(password) = password {
            active.password_hash = Set(hash(password, self.hash_cost)?);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn update_flags(
        &self,
        user_id: i32,
        update: UserFlagsUpdate,
    ) -> Result<user::Model, UserStoreError> {
        let mut active: user::ActiveModel = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(UserStoreError::NotFound(user_id))?
            .into();

        active.name = Set(update.name);
        active.is_active = Set(update.is_active);
        active.is_staff = Set(update.is_staff);
        active.is_superuser = Set(update.is_superuser);
        active.updated_at = Set(Utc::now());

        let user = active.update(&self.db).await?;
        info!(user_id, is_staff = user.is_staff, is_active = user.is_active, "Updated user flags.");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_fixtures::test_user_store;

    #[test]
    fn test_normalize_email_lowercases_whole_address() {
        assert_eq!(normalize_email("Test@GMAIL.com"), "test@gmail.com");
        assert_eq!(normalize_email("  someone@Example.ORG "), "someone@example.org");
    }

    #[tokio::test]
    async fn test_create_user_with_email_successful() {
        let store = test_user_store().await;

        let user = store
            .create_user(Some("test@gmail.com"), "abc123", NewUserFields::default())
            .await
            .unwrap();

        assert_eq!(user.email, "test@gmail.com");
        assert!(check_password(&user, "abc123"));
        assert!(!check_password(&user, "wrong"));
        assert_ne!(user.password_hash, "abc123");
        assert_eq!(user.name, "");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
    }

    #[tokio::test]
    async fn test_new_user_email_normalized() {
        let store = test_user_store().await;

        let user = store
            .create_user(Some("test@GMAIL.com"), "abc123", NewUserFields::default())
            .await
            .unwrap();

        assert_eq!(user.email, "test@gmail.com");
    }

    #[tokio::test]
    async fn test_new_user_invalid_email() {
        let store = test_user_store().await;

        let missing = store.create_user(None, "abc123", NewUserFields::default()).await;
        assert!(matches!(missing, Err(UserStoreError::MissingEmail)));

        let blank = store.create_user(Some("   "), "abc123", NewUserFields::default()).await;
        assert!(matches!(blank, Err(UserStoreError::MissingEmail)));

        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_superuser_is_successful() {
        let store = test_user_store().await;

        let user = store
            .create_superuser(Some("test@gmail.com"), "abc123", NewUserFields::default())
            .await
            .unwrap();

        assert_eq!(user.email, "test@gmail.com");
        assert!(check_password(&user, "abc123"));
        assert!(user.is_staff);
        assert!(user.is_superuser);
    }

    #[tokio::test]
    async fn test_create_superuser_invalid_email() {
        let store = test_user_store().await;

        let result = store.create_superuser(None, "abc123", NewUserFields::default()).await;
        assert!(matches!(result, Err(UserStoreError::MissingEmail)));
    }

    #[tokio::test]
    async fn test_create_superuser_extra_fields() {
        let store = test_user_store().await;

        let user = store
            .create_superuser(
                Some("test@gmail.com"),
                "abc123",
                NewUserFields { name: "thaddeus".to_string() },
            )
            .await
            .unwrap();

        assert_eq!(user.name, "thaddeus");
    }

    #[tokio::test]
    async fn test_duplicate_email_differing_in_case_is_rejected() {
        let store = test_user_store().await;
        store
            .create_user(Some("test@gmail.com"), "abc123", NewUserFields::default())
            .await
            .unwrap();

        let result = store
            .create_user(Some("TEST@gmail.com"), "other", NewUserFields::default())
            .await;

        assert!(matches!(result, Err(UserStoreError::EmailTaken(email)) if email == "test@gmail.com"));
    }

    #[tokio::test]
    async fn test_authenticate_checks_password_and_active_flag() {
        let store = test_user_store().await;
        let user = store
            .create_user(Some("cook@example.com"), "secret", NewUserFields::default())
            .await
            .unwrap();

        assert!(store.authenticate("COOK@example.com", "secret").await.unwrap().is_some());
        assert!(store.authenticate("cook@example.com", "nope").await.unwrap().is_none());

        store
            .update_flags(
                user.id,
                UserFlagsUpdate { name: String::new(), is_active: false, is_staff: false, is_superuser: false },
            )
            .await
            .unwrap();
        assert!(store.authenticate("cook@example.com", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_rehashes_password() {
        let store = test_user_store().await;
        let user = store
            .create_user(Some("cook@example.com"), "secret", NewUserFields::default())
            .await
            .unwrap();

        let updated = store
            .update_profile(user.id, Some("Chef".to_string()), Some("newsecret"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Chef");
        assert!(check_password(&updated, "newsecret"));
        assert!(!check_password(&updated, "secret"));

        let missing = store.update_profile(9999, None, None).await;
        assert!(matches!(missing, Err(UserStoreError::NotFound(9999))));
    }
}
