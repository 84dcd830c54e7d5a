use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::TagService;
use crate::web::models::{ApiJson, AssignedOnlyQuery, AuthenticatedUser, NameRequest, TagResponse};
use crate::web::{AppError, AppState};

// --- Route Handlers ---

async fn list_tags_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AssignedOnlyQuery>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = TagService::list_tags(
        &app_state.db_pool,
        authenticated_user.id,
        query.assigned_only()?,
    )
    .await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

async fn create_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<(StatusCode, Json<TagResponse>), AppError> {
    let tag = TagService::create_tag(&app_state.db_pool, authenticated_user.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

async fn update_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = TagService::rename_tag(&app_state.db_pool, authenticated_user.id, tag_id, &payload.name).await?;
    Ok(Json(tag.into()))
}

async fn delete_tag_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    TagService::delete_tag(&app_state.db_pool, authenticated_user.id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Router ---

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tags_handler).post(create_tag_handler))
        .route("/{tag_id}", patch(update_tag_handler).put(update_tag_handler).delete(delete_tag_handler))
}
