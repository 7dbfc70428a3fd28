//! Authentication API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, unique_email, unique_username, TestApp, TEST_PASSWORD};

fn registration(username: &str, email: &str) -> serde_json::Value {
    json!({
        "username": username,
        "email": email,
        "password": TEST_PASSWORD,
        "password_confirm": TEST_PASSWORD,
    })
}

/// Test user registration with valid data
#[tokio::test]
async fn test_register_with_valid_data() {
    let app = TestApp::new();
    let username = unique_username();

    let response = app
        .post_json("/api/auth/register", &registration(&username, &unique_email()))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], username.as_str());
    assert!(json["user"]["id"].is_string());
    assert!(json["user"].get("password_hash").is_none());
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
}

/// Test registration fails with invalid email
#[tokio::test]
async fn test_register_with_invalid_email_fails() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/auth/register", &registration(&unique_username(), "not-an-email"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test registration fails with short password
#[tokio::test]
async fn test_register_with_short_password_fails() {
    let app = TestApp::new();
    let body = json!({
        "username": unique_username(),
        "email": unique_email(),
        "password": "short",
        "password_confirm": "short",
    });

    let response = app.post_json("/api/auth/register", &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_with_mismatched_confirmation_fails() {
    let app = TestApp::new();
    let body = json!({
        "username": unique_username(),
        "email": unique_email(),
        "password": TEST_PASSWORD,
        "password_confirm": "SomethingElse123!",
    });

    let response = app.post_json("/api/auth/register", &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test registration fails with duplicate username or email
#[tokio::test]
async fn test_register_with_duplicate_identity_fails() {
    let app = TestApp::new();
    let username = unique_username();
    let email = unique_email();

    let first = app
        .post_json("/api/auth/register", &registration(&username, &email))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let same_username = app
        .post_json("/api/auth/register", &registration(&username, &unique_email()))
        .await;
    assert_eq!(same_username.status(), StatusCode::CONFLICT);

    let same_email = app
        .post_json("/api/auth/register", &registration(&unique_username(), &email))
        .await;
    assert_eq!(same_email.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({ "username": user.username, "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id.as_str());
    assert!(json["access_token"].is_string());
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({ "username": user.username, "password": "WrongPassword123!" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_for_deactivated_account_fails() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .post_auth(&format!("/api/users/{}/deactivate", user.id), &user.access_token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .post_json(
            "/api/auth/login",
            &json!({ "username": user.username, "password": TEST_PASSWORD }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_usable_access_token() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .post_json("/api/auth/token/refresh", &json!({ "refresh": user.refresh_token }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let access = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let me = app.get_auth("/api/users/me", &access).await;
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_access_token_cannot_be_used_to_refresh() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app
        .post_json("/api/auth/token/refresh", &json!({ "refresh": user.access_token }))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_rejected_by_protected_routes() {
    let app = TestApp::new();
    let user = app.register().await;

    let response = app.get_auth("/api/users/me", &user.refresh_token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new();

    let response = app.get_auth("/api/rooms", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 10003);
}
