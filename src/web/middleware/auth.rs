use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::warn;

use crate::db::entities::user;
use crate::services::auth_service::decode_jwt;
use crate::web::models::AuthenticatedUser;
use crate::web::{AppState, error::AppError};

pub const TOKEN_COOKIE: &str = "token";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Http-only cookie carrying a freshly issued token.
pub fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build()
}

/// Resolves the caller from a bearer token (or the `token` cookie) and
/// reloads the account, so deactivated or deleted users are rejected even
/// while their token is still valid.
async fn authenticate_request(
    state: &AppState,
    jar: &CookieJar,
    headers: &HeaderMap,
) -> Result<user::Model, AppError> {
    // Try to get token from Authorization header first, then fall back to cookie
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()))
        .ok_or(AppError::InvalidCredentials)?;

    let claims = decode_jwt(&token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = ?e, "JWT decoding error during auth middleware.");
        AppError::InvalidCredentials
    })?;

    match state.user_store.find_by_id(claims.user_id).await? {
        Some(user) if user.is_active => Ok(user),
        Some(_) => {
            warn!(user_id = claims.user_id, "Rejected token of an inactive user.");
            Err(AppError::InvalidCredentials)
        }
        None => {
            warn!(user_id = claims.user_id, "Rejected token of a deleted user.");
            Err(AppError::InvalidCredentials)
        }
    }
}

fn insert_user(req: &mut Request<AxumBody>, user: user::Model) {
    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        email: user.email.clone(),
    });
    req.extensions_mut().insert(user);
}

/// Stores the caller as `AuthenticatedUser` (and its `user::Model`) in the
/// request extensions. Requests without a valid token never reach the handler.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate_request(&state, &jar, req.headers()).await?;
    insert_user(&mut req, user);
    Ok(next.run(req).await)
}

/// Same as `auth`, but anonymous browsers are sent to the admin login page.
pub async fn admin_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    match authenticate_request(&state, &jar, req.headers()).await {
        Ok(user) => {
            insert_user(&mut req, user);
            Ok(next.run(req).await)
        }
        Err(AppError::InvalidCredentials) => Ok(Redirect::to(ADMIN_LOGIN_PATH).into_response()),
        Err(e) => Err(e),
    }
}

/// Admin gate, layered after `admin_auth`: the account must carry the staff
/// flag.
pub async fn require_staff(req: Request<AxumBody>, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<user::Model>()
        .ok_or(AppError::InvalidCredentials)?;

    if !user.is_staff {
        warn!(user_id = user.id, "Non-staff user attempted to access the admin site.");
        return Err(AppError::Forbidden(
            "You do not have permission to access the admin site.".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
