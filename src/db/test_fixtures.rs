#![allow(dead_code)]

use sea_orm::DatabaseConnection;

use crate::db::services::user_service::{NewUserFields, UserStore};
use crate::db::entities::user;

/// Lowest cost bcrypt accepts; keeps hashing out of the test runtime.
pub const TEST_HASH_COST: u32 = 4;

pub async fn test_db() -> DatabaseConnection {
    let db = super::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open");
    super::schema::create_tables(&db)
        .await
        .expect("schema should be created");
    db
}

pub async fn test_user_store() -> UserStore {
    UserStore::new(test_db().await, TEST_HASH_COST)
}

pub async fn create_test_user(store: &UserStore, email: &str) -> user::Model {
    store
        .create_user(Some(email), "testpass", NewUserFields::default())
        .await
        .expect("test user should be created")
}
