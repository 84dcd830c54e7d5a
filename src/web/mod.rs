use axum::{
    http::{Method, header},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::services::UserStore;
use crate::server::config::ServerConfig;
use crate::web::middleware::auth;
use crate::web::routes::*;

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod templates;

pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub user_store: UserStore,
    pub templates: Arc<Tera>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db_pool: DatabaseConnection, templates: Tera, config: Arc<ServerConfig>) -> Self {
        let user_store = UserStore::new(db_pool.clone(), config.password_hash_cost);
        Self {
            db_pool,
            user_store,
            templates: Arc::new(templates),
            config,
        }
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: AppState) -> Router {
    let app_state = Arc::new(app_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .nest(
            "/api/user",
            user_routes::create_public_router().merge(
                user_routes::create_user_router()
                    .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
            ),
        )
        .nest(
            "/api/tags",
            tag_routes::create_tags_router().route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/ingredients",
            ingredient_routes::create_ingredients_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/recipes",
            recipe_routes::recipe_routes().route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/admin",
            admin_routes::create_admin_login_router().merge(
                admin_routes::create_admin_router()
                    // Layers run outside-in, so `admin_auth` must be added last.
                    .route_layer(axum_middleware::from_fn(auth::require_staff))
                    .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::admin_auth)),
            ),
        )
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
