use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::db::entities::user;
use crate::db::services::UserStore;
use crate::web::error::AppError;
use crate::web::models::{Claims, TokenRequest, TokenResponse};

/// Exchanges email and password for a signed token. Unknown emails, wrong
/// passwords and inactive accounts all produce the same validation error.
pub async fn login_user(
    store: &UserStore,
    req: TokenRequest,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<TokenResponse, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput("Email and password are required.".to_string()));
    }

    let user = store
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or_else(|| {
            AppError::InvalidInput("Unable to authenticate with provided credentials.".to_string())
        })?;

    create_jwt_for_user(&user, jwt_secret, ttl_hours)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<TokenResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(TokenResponse { token })
}

/// Verifies signature and expiry, returning the claims.
pub fn decode_jwt(token: &str, jwt_secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
