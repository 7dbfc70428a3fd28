//! Room API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_created_room_has_creator_as_member() {
    let app = TestApp::new();
    let alice = app.register().await;

    let response = app
        .post_json_auth("/api/rooms", &json!({ "name": "general" }), &alice.access_token)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let room = body_json(response).await;
    assert_eq!(room["name"], "general");
    assert_eq!(room["member_count"], 1);

    let members = body_json(
        app.get_auth(
            &format!("/api/room-members?room_id={}", room["id"].as_str().unwrap()),
            &alice.access_token,
        )
        .await,
    )
    .await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["user"], alice.id.as_str());
}

#[tokio::test]
async fn test_room_name_validation() {
    let app = TestApp::new();
    let alice = app.register().await;

    let blank = app
        .post_json_auth("/api/rooms", &json!({ "name": "  " }), &alice.access_token)
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let too_long = app
        .post_json_auth(
            "/api/rooms",
            &json!({ "name": "x".repeat(256) }),
            &alice.access_token,
        )
        .await;
    assert_eq!(too_long.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_room_listing_only_shows_memberships() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    app.create_room(&alice, "general").await;

    let alice_rooms = body_json(app.get_auth("/api/rooms", &alice.access_token).await).await;
    assert_eq!(alice_rooms.as_array().unwrap().len(), 1);

    let bob_rooms = body_json(app.get_auth("/api/rooms", &bob.access_token).await).await;
    assert!(bob_rooms.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_member_cannot_read_rename_or_delete() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    let uri = format!("/api/rooms/{}", room);

    assert_eq!(
        app.get_auth(&uri, &bob.access_token).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.patch_json_auth(&uri, &json!({ "name": "hijacked" }), &bob.access_token)
            .await
            .status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.delete_auth(&uri, &bob.access_token).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_any_member_can_rename_and_delete() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    app.add_member(&alice, &room, &bob).await;
    let uri = format!("/api/rooms/{}", room);

    let renamed = app
        .patch_json_auth(&uri, &json!({ "name": "random" }), &bob.access_token)
        .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    assert_eq!(body_json(renamed).await["name"], "random");

    let deleted = app.delete_auth(&uri, &bob.access_token).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    assert_eq!(
        app.get_auth(&uri, &alice.access_token).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_missing_room_is_not_found_before_policy() {
    let app = TestApp::new();
    let alice = app.register().await;

    let response = app.get_auth("/api/rooms/42", &alice.access_token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], 10001);
}
