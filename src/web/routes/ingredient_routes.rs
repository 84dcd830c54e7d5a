use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::IngredientService;
use crate::web::models::{
    ApiJson, AssignedOnlyQuery, AuthenticatedUser, IngredientResponse, NameRequest,
};
use crate::web::{AppError, AppState};

async fn list_ingredients_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AssignedOnlyQuery>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let ingredients = IngredientService::list_ingredients(
        &app_state.db_pool,
        authenticated_user.id,
        query.assigned_only()?,
    )
    .await?;
    Ok(Json(ingredients.into_iter().map(IngredientResponse::from).collect()))
}

async fn create_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), AppError> {
    let ingredient =
        IngredientService::create_ingredient(&app_state.db_pool, authenticated_user.id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

async fn update_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = IngredientService::rename_ingredient(
        &app_state.db_pool,
        authenticated_user.id,
        ingredient_id,
        &payload.name,
    )
    .await?;
    Ok(Json(ingredient.into()))
}

async fn delete_ingredient_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(ingredient_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    IngredientService::delete_ingredient(&app_state.db_pool, authenticated_user.id, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_ingredients_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_ingredients_handler).post(create_ingredient_handler))
        .route(
            "/{ingredient_id}",
            patch(update_ingredient_handler)
                .put(update_ingredient_handler)
                .delete(delete_ingredient_handler),
        )
}
