//! Room Message API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp, TestUser};

async fn post(app: &TestApp, user: &TestUser, room: &str, content: &str) -> axum::response::Response {
    app.post_json_auth(
        "/api/room-messages",
        &json!({ "room": room, "content": content }),
        &user.access_token,
    )
    .await
}

#[tokio::test]
async fn test_membership_gates_room_chat() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;

    let rejected = post(&app, &bob, &room, "hi").await;
    assert_eq!(rejected.status(), StatusCode::FORBIDDEN);

    let added = app.add_member(&alice, &room, &bob).await;
    assert_eq!(added.status(), StatusCode::CREATED);
    let detail = body_json(
        app.get_auth(&format!("/api/rooms/{}", room), &alice.access_token)
            .await,
    )
    .await;
    assert_eq!(detail["member_count"], 2);

    assert_eq!(post(&app, &alice, &room, "welcome").await.status(), StatusCode::CREATED);
    let sent = post(&app, &bob, &room, "hi").await;
    assert_eq!(sent.status(), StatusCode::CREATED);
    assert_eq!(body_json(sent).await["sender_username"], bob.username.as_str());

    let listing = body_json(
        app.get_auth(
            &format!("/api/room-messages/by_room?room_id={}", room),
            &bob.access_token,
        )
        .await,
    )
    .await;
    let contents: Vec<_> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["welcome", "hi"]);
}

#[tokio::test]
async fn test_non_member_cannot_list_room_messages() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    post(&app, &alice, &room, "secret").await;

    let uri = format!("/api/room-messages/by_room?room_id={}", room);
    assert_eq!(
        app.get_auth(&uri, &bob.access_token).await.status(),
        StatusCode::FORBIDDEN
    );

    app.add_member(&alice, &room, &bob).await;
    assert_eq!(app.get_auth(&uri, &bob.access_token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_by_room_requires_room_id() {
    let app = TestApp::new();
    let alice = app.register().await;

    let response = app
        .get_auth("/api/room-messages/by_room", &alice.access_token)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_visible_listing_spans_callers_rooms_only() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let shared = app.create_room(&alice, "shared").await;
    let private = app.create_room(&alice, "private").await;
    app.add_member(&alice, &shared, &bob).await;
    post(&app, &alice, &shared, "for everyone").await;
    post(&app, &alice, &private, "for alice").await;

    let bob_view = body_json(app.get_auth("/api/room-messages", &bob.access_token).await).await;
    let bob_view = bob_view.as_array().unwrap();
    assert_eq!(bob_view.len(), 1);
    assert_eq!(bob_view[0]["content"], "for everyone");

    let alice_view = body_json(app.get_auth("/api/room-messages", &alice.access_token).await).await;
    assert_eq!(alice_view[0]["content"], "for alice");
    assert_eq!(alice_view.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_message_detail_and_delete_require_membership() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    let message = body_json(post(&app, &alice, &room, "hello").await).await;
    let uri = format!("/api/room-messages/{}", message["id"].as_str().unwrap());

    assert_eq!(
        app.get_auth(&uri, &bob.access_token).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.delete_auth(&uri, &bob.access_token).await.status(),
        StatusCode::FORBIDDEN
    );

    assert_eq!(app.get_auth(&uri, &alice.access_token).await.status(), StatusCode::OK);
    assert_eq!(
        app.delete_auth(&uri, &alice.access_token).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.get_auth(&uri, &alice.access_token).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_leaving_revokes_access() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    let membership = body_json(app.add_member(&alice, &room, &bob).await).await;

    app.delete_auth(
        &format!("/api/room-members/{}", membership["id"].as_str().unwrap()),
        &bob.access_token,
    )
    .await;

    assert_eq!(post(&app, &bob, &room, "still here?").await.status(), StatusCode::FORBIDDEN);
}
