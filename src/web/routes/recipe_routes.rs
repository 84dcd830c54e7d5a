use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::{RecipeFilter, RecipeService};
use crate::web::models::{
    ApiJson, AuthenticatedUser, RecipeDetailResponse, RecipeListQuery, RecipePatchRequest,
    RecipeRequest, RecipeResponse, parse_id_list,
};
use crate::web::{AppError, AppState};

pub fn recipe_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/{id}",
            get(get_recipe).put(update_recipe).patch(patch_recipe).delete(delete_recipe),
        )
        .route("/{id}/tags/{tag_id}", put(add_tag).delete(remove_tag))
        .route(
            "/{id}/ingredients/{ingredient_id}",
            put(add_ingredient).delete(remove_ingredient),
        )
}

async fn list_recipes(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let filter = RecipeFilter {
        tags: parse_id_list(query.tags.as_deref(), "tags")?,
        ingredients: parse_id_list(query.ingredients.as_deref(), "ingredients")?,
    };
    let recipes = RecipeService::list_recipes(&app_state.db_pool, user.id, filter).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

async fn create_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let recipe = RecipeService::create_recipe(&app_state.db_pool, user.id, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

async fn get_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let detail = RecipeService::get_recipe(&app_state.db_pool, user.id, id).await?;
    Ok(Json(detail.into()))
}

async fn update_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = RecipeService::update_recipe(&app_state.db_pool, user.id, id, payload.into()).await?;
    Ok(Json(recipe.into()))
}

async fn patch_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<RecipePatchRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = RecipeService::patch_recipe(&app_state.db_pool, user.id, id, payload.into()).await?;
    Ok(Json(recipe.into()))
}

async fn delete_recipe(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    RecipeService::delete_recipe(&app_state.db_pool, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    RecipeService::add_tag(&app_state.db_pool, user.id, id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    RecipeService::remove_tag(&app_state.db_pool, user.id, id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_ingredient(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, ingredient_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    RecipeService::add_ingredient(&app_state.db_pool, user.id, id, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_ingredient(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, ingredient_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    RecipeService::remove_ingredient(&app_state.db_pool, user.id, id, ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
