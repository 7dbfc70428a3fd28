//! Direct Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp, TestUser};

async fn send(app: &TestApp, from: &TestUser, to: &TestUser, content: &str) -> String {
    let response = app
        .post_json_auth(
            "/api/messages",
            &json!({ "receiver": to.id, "content": content }),
            &from.access_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_dm_read_flag_lifecycle() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;

    let response = app
        .post_json_auth(
            "/api/messages",
            &json!({ "receiver": bob.id, "content": "hello" }),
            &alice.access_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["is_read"], false);
    assert_eq!(created["sender"], alice.id.as_str());
    assert_eq!(created["receiver_username"], bob.username.as_str());
    let message_id = created["id"].as_str().unwrap().to_string();

    let conversation = body_json(
        app.get_auth(
            &format!("/api/messages/conversation?user_id={}", alice.id),
            &bob.access_token,
        )
        .await,
    )
    .await;
    let conversation = conversation.as_array().unwrap();
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation[0]["content"], "hello");

    let marked = app
        .patch_auth(&format!("/api/messages/{}/mark_read", message_id), &bob.access_token)
        .await;
    assert_eq!(marked.status(), StatusCode::OK);
    assert_eq!(body_json(marked).await["is_read"], true);

    let by_sender = app
        .patch_auth(&format!("/api/messages/{}/mark_read", message_id), &alice.access_token)
        .await;
    assert_eq!(by_sender.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dm_is_invisible_to_third_parties() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let carol = app.register().await;
    let message_id = send(&app, &alice, &bob, "private").await;

    let get = app
        .get_auth(&format!("/api/messages/{}", message_id), &carol.access_token)
        .await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let delete = app
        .delete_auth(&format!("/api/messages/{}", message_id), &carol.access_token)
        .await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    let listing = body_json(app.get_auth("/api/messages", &carol.access_token).await).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_sender_deletes() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let message_id = send(&app, &alice, &bob, "hello").await;

    let by_receiver = app
        .delete_auth(&format!("/api/messages/{}", message_id), &bob.access_token)
        .await;
    assert_eq!(by_receiver.status(), StatusCode::FORBIDDEN);

    let by_sender = app
        .delete_auth(&format!("/api/messages/{}", message_id), &alice.access_token)
        .await;
    assert_eq!(by_sender.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_listing_is_newest_first_and_conversation_oldest_first() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    send(&app, &alice, &bob, "first").await;
    send(&app, &bob, &alice, "second").await;

    let listing = body_json(app.get_auth("/api/messages", &alice.access_token).await).await;
    let contents: Vec<_> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["second", "first"]);

    let conversation = body_json(
        app.get_auth(
            &format!("/api/messages/conversation?user_id={}", bob.id),
            &alice.access_token,
        )
        .await,
    )
    .await;
    let contents: Vec<_> = conversation
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["first", "second"]);
}

#[tokio::test]
async fn test_conversation_requires_user_id() {
    let app = TestApp::new();
    let alice = app.register().await;

    let response = app
        .get_auth("/api/messages/conversation", &alice.access_token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_validation() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;

    let blank = app
        .post_json_auth(
            "/api/messages",
            &json!({ "receiver": bob.id, "content": "   " }),
            &alice.access_token,
        )
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let unknown_receiver = app
        .post_json_auth(
            "/api/messages",
            &json!({ "receiver": "42", "content": "hi" }),
            &alice.access_token,
        )
        .await;
    assert_eq!(unknown_receiver.status(), StatusCode::BAD_REQUEST);
}
