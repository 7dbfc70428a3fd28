//! Room Membership API Tests

use axum::http::StatusCode;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_adding_same_user_twice_conflicts() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;

    let first = app.add_member(&alice, &room, &bob).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.add_member(&alice, &room, &bob).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let members = body_json(
        app.get_auth(&format!("/api/room-members?room_id={}", room), &alice.access_token)
            .await,
    )
    .await;
    let bob_rows = members
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["user"] == bob.id.as_str())
        .count();
    assert_eq!(bob_rows, 1);
}

#[tokio::test]
async fn test_non_member_cannot_add_anyone() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;

    let response = app.add_member(&bob, &room, &bob).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_can_leave() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    let membership = body_json(app.add_member(&alice, &room, &bob).await).await;
    let membership_id = membership["id"].as_str().unwrap();

    let response = app
        .delete_auth(&format!("/api/room-members/{}", membership_id), &bob.access_token)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let rooms = body_json(app.get_auth("/api/rooms", &bob.access_token).await).await;
    assert!(rooms.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_member_can_remove_other_member() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    let membership = body_json(app.add_member(&alice, &room, &bob).await).await;

    let response = app
        .delete_auth(
            &format!("/api/room-members/{}", membership["id"].as_str().unwrap()),
            &alice.access_token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_non_member_cannot_remove_anyone() {
    let app = TestApp::new();
    let alice = app.register().await;
    let mallory = app.register().await;
    let room = app.create_room(&alice, "general").await;

    let members = body_json(
        app.get_auth(&format!("/api/room-members?room_id={}", room), &alice.access_token)
            .await,
    )
    .await;
    let alice_membership = members[0]["id"].as_str().unwrap().to_string();

    let response = app
        .delete_auth(
            &format!("/api/room-members/{}", alice_membership),
            &mallory.access_token,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let detail = app
        .get_auth(
            &format!("/api/room-members/{}", alice_membership),
            &mallory.access_token,
        )
        .await;
    assert_eq!(detail.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_membership_listing_is_scoped_to_callers_rooms() {
    let app = TestApp::new();
    let alice = app.register().await;
    let bob = app.register().await;
    let room = app.create_room(&alice, "general").await;
    app.create_room(&bob, "private").await;

    let visible = body_json(app.get_auth("/api/room-members", &alice.access_token).await).await;
    let visible = visible.as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["room"], room.as_str());

    let filtered = app
        .get_auth(&format!("/api/room-members?room_id={}", room), &bob.access_token)
        .await;
    assert_eq!(filtered.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_adding_unknown_user_is_rejected() {
    let app = TestApp::new();
    let alice = app.register().await;
    let room = app.create_room(&alice, "general").await;

    let response = app
        .post_json_auth(
            "/api/room-members",
            &serde_json::json!({ "room": room, "user": "42" }),
            &alice.access_token,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
