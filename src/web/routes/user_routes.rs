use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::db::services::NewUserFields;
use crate::services::auth_service;
use crate::web::middleware::auth::token_cookie;
use crate::web::models::{
    ApiJson, AuthenticatedUser, RegisterRequest, TokenRequest, UpdateMeRequest, UserResponse,
};
use crate::web::{AppError, AppState};

const MIN_PASSWORD_LEN: usize = 5;

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }
    Ok(())
}

/// Registration and token issuance; reachable without a token.
pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(register))
        .route("/token", post(issue_token))
}

pub fn create_user_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(get_me).patch(update_me).put(update_me))
}

async fn register(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    validate_password(&payload.password)?;

    let user = app_state
        .user_store
        .create_user(
            payload.email.as_deref(),
            &payload.password,
            NewUserFields { name: payload.name.trim().to_string() },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn issue_token(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token_response = auth_service::login_user(
        &app_state.user_store,
        payload,
        &app_state.config.jwt_secret,
        app_state.config.token_ttl_hours,
    )
    .await?;

    let auth_cookie = token_cookie(token_response.token.clone());
    Ok((jar.add(auth_cookie), Json(token_response)))
}

async fn get_me(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = app_state
        .user_store
        .find_by_id(auth_user.id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(Json(user.into()))
}

async fn update_me(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if let Some(password) = payload.password.as_deref() {
        validate_password(password)?;
    }

    let user = app_state
        .user_store
        .update_profile(
            auth_user.id,
            payload.name.map(|name| name.trim().to_string()),
            payload.password.as_deref(),
        )
        .await?;
    Ok(Json(user.into()))
}
