use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use std::sync::Arc;
use tera::Context;
use tracing::info;

use crate::db::entities::user;
use crate::db::services::{NewUserFields, UserFlagsUpdate, UserStoreError};
use crate::services::auth_service::create_jwt_for_user;
use crate::web::middleware::auth::{ADMIN_LOGIN_PATH, TOKEN_COOKIE, token_cookie};
use crate::web::{AppError, AppState};

/// Login and logout; reachable without a token.
pub fn create_admin_login_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout))
}

pub fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(user_changelist))
        .route("/users/add", get(user_add_page).post(user_add_submit))
        .route("/users/{user_id}", get(user_change_page).post(user_change_submit))
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct AddUserForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Unchecked checkboxes are simply absent from the submitted form.
#[derive(Deserialize)]
pub struct ChangeUserForm {
    #[serde(default)]
    pub name: String,
    pub is_active: Option<String>,
    pub is_staff: Option<String>,
    pub is_superuser: Option<String>,
}

fn render(app_state: &AppState, template: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(app_state.templates.render(template, context)?))
}

fn base_context(current_user: &user::Model) -> Context {
    let mut context = Context::new();
    context.insert("current_user", current_user);
    context
}

fn render_login(
    app_state: &AppState,
    email: &str,
    errors: &[String],
    status: StatusCode,
) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("email", email);
    context.insert("errors", errors);
    let page = render(app_state, "admin/login.html", &context)?;
    Ok((status, page).into_response())
}

async fn login_page(State(app_state): State<Arc<AppState>>) -> Result<Response, AppError> {
    render_login(&app_state, "", &[], StatusCode::OK)
}

/// Only active staff accounts may sign in here; the issued token is the same
/// one `/api/user/token` hands out, stored in the `token` cookie.
async fn login_submit(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = app_state
        .user_store
        .authenticate(&form.email, &form.password)
        .await?
        .filter(|user| user.is_staff);

    let Some(user) = user else {
        let errors = vec![
            "Please enter the correct email and password for a staff account.".to_string(),
        ];
        return render_login(&app_state, &form.email, &errors, StatusCode::BAD_REQUEST);
    };

    let token = create_jwt_for_user(
        &user,
        &app_state.config.jwt_secret,
        app_state.config.token_ttl_hours,
    )?
    .token;

    info!(user_id = user.id, "Admin signed in.");
    Ok((jar.add(token_cookie(token)), Redirect::to("/admin/users")).into_response())
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
        Redirect::to(ADMIN_LOGIN_PATH),
    )
}

async fn user_changelist(
    State(app_state): State<Arc<AppState>>,
    Extension(current_user): Extension<user::Model>,
) -> Result<Html<String>, AppError> {
    let users = app_state.user_store.list_users().await?;

    let mut context = base_context(&current_user);
    context.insert("users", &users);
    render(&app_state, "admin/user_list.html", &context)
}

async fn user_change_page(
    State(app_state): State<Arc<AppState>>,
    Extension(current_user): Extension<user::Model>,
    Path(user_id): Path<i32>,
) -> Result<Html<String>, AppError> {
    let user = app_state
        .user_store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with ID {user_id} not found")))?;

    let mut context = base_context(&current_user);
    context.insert("user", &user);
    render(&app_state, "admin/user_change.html", &context)
}

async fn user_change_submit(
    State(app_state): State<Arc<AppState>>,
    Extension(current_user): Extension<user::Model>,
    Path(user_id): Path<i32>,
    Form(form): Form<ChangeUserForm>,
) -> Result<Redirect, AppError> {
    app_state
        .user_store
        .update_flags(
            user_id,
            UserFlagsUpdate {
                name: form.name.trim().to_string(),
                is_active: form.is_active.is_some(),
                is_staff: form.is_staff.is_some(),
                is_superuser: form.is_superuser.is_some(),
            },
        )
        .await
        .map_err(|e| match e {
            UserStoreError::NotFound(id) => AppError::NotFound(format!("User with ID {id} not found")),
            other => other.into(),
        })?;

    info!(admin_id = current_user.id, user_id, "Admin changed user.");
    Ok(Redirect::to("/admin/users"))
}

async fn user_add_page(
    State(app_state): State<Arc<AppState>>,
    Extension(current_user): Extension<user::Model>,
) -> Result<Html<String>, AppError> {
    let mut context = base_context(&current_user);
    context.insert("email", "");
    context.insert("name", "");
    context.insert("errors", &Vec::<String>::new());
    render(&app_state, "admin/user_add.html", &context)
}

/// Creates the account through the user store, so the admin form gets the
/// same email validation as every other entry point.
async fn user_add_submit(
    State(app_state): State<Arc<AppState>>,
    Extension(current_user): Extension<user::Model>,
    Form(form): Form<AddUserForm>,
) -> Result<Response, AppError> {
    let mut errors = Vec::new();
    if form.password1.is_empty() {
        errors.push("Password is required.".to_string());
    } else if form.password1 != form.password2 {
        errors.push("The two password fields didn't match.".to_string());
    }

    if errors.is_empty() {
        let result = app_state
            .user_store
            .create_user(
                Some(form.email.as_str()),
                &form.password1,
                NewUserFields { name: form.name.trim().to_string() },
            )
            .await;
        match result {
            Ok(user) => {
                info!(admin_id = current_user.id, user_id = user.id, "Admin created user.");
                return Ok(Redirect::to("/admin/users").into_response());
            }
            Err(e @ (UserStoreError::MissingEmail | UserStoreError::EmailTaken(_))) => {
                errors.push(e.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut context = base_context(&current_user);
    context.insert("email", &form.email);
    context.insert("name", &form.name);
    context.insert("errors", &errors);
    let page = render(&app_state, "admin/user_add.html", &context)?;
    Ok((StatusCode::BAD_REQUEST, page).into_response())
}
