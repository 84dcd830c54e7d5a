#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::TestServer;
use recipe_backend::db::{self, entities::user, schema, services::{NewUserFields, UserStore}};
use recipe_backend::server::config::ServerConfig;
use recipe_backend::services::auth_service::create_jwt_for_user;
use recipe_backend::web::{self, templates, AppState};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "testpass123";

pub struct TestApp {
    pub server: TestServer,
    pub db: DatabaseConnection,
    pub store: UserStore,
}

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl_hours: 1,
        password_hash_cost: 4,
        log_dir: "logs".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    let config = Arc::new(test_config());
    let db = db::connect(&config.database_url).await.unwrap();
    schema::create_tables(&db).await.unwrap();

    let state = AppState::new(db.clone(), templates::load_templates().unwrap(), config.clone());
    let store = state.user_store.clone();
    let server = TestServer::new(web::create_axum_router(state)).unwrap();

    TestApp { server, db, store }
}

impl TestApp {
    pub async fn create_user(&self, email: &str) -> user::Model {
        self.store
            .create_user(Some(email), TEST_PASSWORD, NewUserFields::default())
            .await
            .unwrap()
    }

    pub async fn create_superuser(&self, email: &str) -> user::Model {
        self.store
            .create_superuser(Some(email), TEST_PASSWORD, NewUserFields::default())
            .await
            .unwrap()
    }
}

/// `Authorization` header carrying a freshly signed token for `user`.
pub fn auth_header(user: &user::Model) -> (HeaderName, HeaderValue) {
    let token = create_jwt_for_user(user, TEST_SECRET, 1).unwrap().token;
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}
