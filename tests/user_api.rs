mod common;

use axum::http::StatusCode;
use recipe_backend::db::entities::prelude::User;
use recipe_backend::db::services::{check_password, UserFlagsUpdate};
use sea_orm::EntityTrait;
use serde_json::{json, Value};

use common::{auth_header, spawn_app, TEST_PASSWORD};

#[tokio::test]
async fn test_create_valid_user_success() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/user/create")
        .json(&json!({
            "email": "Test@GMAIL.com",
            "password": "testpass",
            "name": "Test name",
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "email": "test@gmail.com", "name": "Test name" }));
    assert!(body.get("password").is_none());

    let user = app.store.find_by_email("test@gmail.com").await.unwrap().unwrap();
    assert!(check_password(&user, "testpass"));
}

#[tokio::test]
async fn test_user_exists() {
    let app = spawn_app().await;
    app.create_user("test@gmail.com").await;

    let response = app
        .server
        .post("/api/user/create")
        .json(&json!({ "email": "test@gmail.com", "password": "testpass" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_too_short() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/user/create")
        .json(&json!({ "email": "test@gmail.com", "password": "pw" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.store.find_by_email("test@gmail.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_email_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/user/create")
        .json(&json!({ "password": "testpass" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_token_for_user() {
    let app = spawn_app().await;
    app.create_user("test@gmail.com").await;

    let response = app
        .server
        .post("/api/user/token")
        .json(&json!({ "email": "test@gmail.com", "password": TEST_PASSWORD }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(response.cookie("token").value(), body["token"].as_str().unwrap());
}

#[tokio::test]
async fn test_create_token_invalid_credentials() {
    let app = spawn_app().await;
    app.create_user("test@gmail.com").await;

    let response = app
        .server
        .post("/api/user/token")
        .json(&json!({ "email": "test@gmail.com", "password": "wrong" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_retrieve_user_unauthorized() {
    let app = spawn_app().await;

    let response = app.server.get("/api/user/me").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_and_update_profile() {
    let app = spawn_app().await;
    let user = app.create_user("test@gmail.com").await;

    let (name, value) = auth_header(&user);
    let response = app.server.get("/api/user/me").add_header(name.clone(), value.clone()).await;
    response.assert_status_ok();
    response.assert_json(&json!({ "email": "test@gmail.com", "name": "" }));

    let response = app
        .server
        .patch("/api/user/me")
        .add_header(name, value)
        .json(&json!({ "name": "new name", "password": "newpassword123" }))
        .await;
    response.assert_status_ok();

    let user = app.store.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.name, "new name");
    assert!(check_password(&user, "newpassword123"));
}

#[tokio::test]
async fn test_deactivated_user_token_rejected() {
    let app = spawn_app().await;
    let user = app.create_user("test@gmail.com").await;
    let (name, value) = auth_header(&user);

    app.server
        .get("/api/tags")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status_ok();

    app.store
        .update_flags(
            user.id,
            UserFlagsUpdate {
                name: String::new(),
                is_active: false,
                is_staff: false,
                is_superuser: false,
            },
        )
        .await
        .unwrap();

    app.server
        .get("/api/tags")
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post("/api/tags")
        .add_header(name, value)
        .json(&json!({ "name": "Vegan" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_user_token_rejected() {
    let app = spawn_app().await;
    let user = app.create_user("test@gmail.com").await;
    let (name, value) = auth_header(&user);

    User::delete_by_id(user.id).exec(&app.db).await.unwrap();

    app.server
        .post("/api/tags")
        .add_header(name, value)
        .json(&json!({ "name": "Vegan" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.server.get("/api/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}
