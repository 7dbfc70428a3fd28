//! User API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, unique_username, TestApp};

#[tokio::test]
async fn test_me_returns_caller() {
    let app = TestApp::new();
    let alice = app.register().await;

    let response = app.get_auth("/api/users/me", &alice.access_token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], alice.id.as_str());
    assert_eq!(json["is_active"], true);
}

#[tokio::test]
async fn test_any_account_is_readable() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;

    let response = app
        .get_auth(&format!("/api/users/{}", bob.id), &alice.access_token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let listing = body_json(app.get_auth("/api/users", &alice.access_token).await).await;
    assert_eq!(listing.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unknown_and_malformed_user_ids() {
    let app = TestApp::new();
    let alice = app.register().await;

    let missing = app.get_auth("/api/users/42", &alice.access_token).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let malformed = app.get_auth("/api/users/abc", &alice.access_token).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_edit_is_self_only() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let new_name = unique_username();

    let own = app
        .patch_json_auth(
            &format!("/api/users/{}", alice.id),
            &json!({ "username": new_name }),
            &alice.access_token,
        )
        .await;
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(body_json(own).await["username"], new_name.as_str());

    let other = app
        .patch_json_auth(
            &format!("/api/users/{}", alice.id),
            &json!({ "username": unique_username() }),
            &bob.access_token,
        )
        .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_profile_edit_to_taken_username_conflicts() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;

    let response = app
        .patch_json_auth(
            &format!("/api/users/{}", alice.id),
            &json!({ "username": bob.username }),
            &alice.access_token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_is_self_only() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;

    let forbidden = app
        .delete_auth(&format!("/api/users/{}", alice.id), &bob.access_token)
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let deleted = app
        .delete_auth(&format!("/api/users/{}", alice.id), &alice.access_token)
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app
        .get_auth(&format!("/api/users/{}", alice.id), &bob.access_token)
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivate_is_self_only() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;

    let forbidden = app
        .post_auth(&format!("/api/users/{}/deactivate", alice.id), &bob.access_token)
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_auth(&format!("/api/users/{}/deactivate", alice.id), &alice.access_token)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_active"], false);
}

#[tokio::test]
async fn test_deactivated_account_token_is_rejected() {
    let app = TestApp::new();
    let alice = app.register().await;

    app.post_auth(&format!("/api/users/{}/deactivate", alice.id), &alice.access_token)
        .await;

    let create = app
        .post_json_auth(
            "/api/rooms",
            &json!({ "name": "after hours" }),
            &alice.access_token,
        )
        .await;
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);

    let me = app.get_auth("/api/users/me", &alice.access_token).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_token_is_rejected() {
    let app = TestApp::new();
    let alice = app.register().await;

    app.delete_auth(&format!("/api/users/{}", alice.id), &alice.access_token)
        .await;

    let response = app.get_auth("/api/rooms", &alice.access_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
