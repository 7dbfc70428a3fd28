//! Concurrent Guarded Write Tests
//!
//! Run against PostgreSQL when `TEST_DATABASE_URL` is set, otherwise against
//! the in-memory store.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{body_json, TestApp, TestUser};

const ROUNDS: usize = 20;

async fn app() -> TestApp {
    match TestApp::postgres().await {
        Some(app) => app,
        None => TestApp::new(),
    }
}

async fn membership_id(app: &TestApp, room: &str, viewer: &TestUser, member: &TestUser) -> String {
    let members = body_json(
        app.get_auth(&format!("/api/room-members?room_id={}", room), &viewer.access_token)
            .await,
    )
    .await;
    members
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user"] == member.id.as_str())
        .map(|m| m["id"].as_str().unwrap().to_string())
        .unwrap()
}

fn spawn_delete(app: &TestApp, uri: String, token: String) -> tokio::task::JoinHandle<StatusCode> {
    let app = app.clone();
    tokio::spawn(async move { app.delete_auth(&uri, &token).await.status() })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_members_removing_each_other_concurrently() {
    let app = app().await;

    for _ in 0..ROUNDS {
        let alice = app.register().await;
        let bob = app.register().await;
        let room = app.create_room(&alice, "duel").await;
        let bobs = body_json(app.add_member(&alice, &room, &bob).await).await;
        let bobs = bobs["id"].as_str().unwrap().to_string();
        let alices = membership_id(&app, &room, &alice, &alice).await;

        let first = spawn_delete(
            &app,
            format!("/api/room-members/{}", bobs),
            alice.access_token.clone(),
        );
        let second = spawn_delete(
            &app,
            format!("/api/room-members/{}", alices),
            bob.access_token.clone(),
        );
        let mut statuses = vec![first.await.unwrap(), second.await.unwrap()];
        statuses.sort();

        // Whoever commits first removes the other, who is then no longer a member.
        assert_eq!(statuses, vec![StatusCode::NO_CONTENT, StatusCode::FORBIDDEN]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_room_deleted_twice_concurrently() {
    let app = app().await;

    for _ in 0..ROUNDS {
        let alice = app.register().await;
        let bob = app.register().await;
        let room = app.create_room(&alice, "doomed").await;
        app.add_member(&alice, &room, &bob).await;
        let uri = format!("/api/rooms/{}", room);

        let first = spawn_delete(&app, uri.clone(), alice.access_token.clone());
        let second = spawn_delete(&app, uri, bob.access_token.clone());
        let mut statuses = vec![first.await.unwrap(), second.await.unwrap()];
        statuses.sort();

        assert_eq!(statuses, vec![StatusCode::NO_CONTENT, StatusCode::NOT_FOUND]);
    }
}
