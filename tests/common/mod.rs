//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use chat_backend::config::{
    CorsSettings, DatabaseSettings, JwtSettings, ServerSettings, Settings, SnowflakeSettings,
    StorageBackend,
};
use chat_backend::infrastructure::database::{create_pool, run_migrations};
use chat_backend::startup::{build_router, AppState};

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Settings for an in-memory application
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-at-least-32-chars".into(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 1,
        },
        snowflake: SnowflakeSettings { machine_id: 1 },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        environment: "test".into(),
    }
}

/// A registered account with its tokens
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Test application over a fresh in-memory store
#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: build_router(AppState::in_memory(test_settings())),
        }
    }

    /// Application over the PostgreSQL database named by `TEST_DATABASE_URL`,
    /// or `None` when the variable is unset.
    pub async fn postgres() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let mut settings = test_settings();
        settings.database.backend = StorageBackend::Postgres;
        settings.database.url = url;
        settings.database.max_connections = 10;

        let pool = create_pool(&settings.database).await.unwrap();
        run_migrations(&pool).await.unwrap();

        Some(Self {
            router: build_router(AppState::postgres(pool, settings)),
        })
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.send("GET", uri, None, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.send("POST", uri, Some(body), None).await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, uri: &str, token: &str) -> Response {
        self.send("GET", uri, None, Some(token)).await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_json_auth(&self, uri: &str, body: &Value, token: &str) -> Response {
        self.send("POST", uri, Some(body), Some(token)).await
    }

    /// Make an authenticated POST request without a body
    pub async fn post_auth(&self, uri: &str, token: &str) -> Response {
        self.send("POST", uri, None, Some(token)).await
    }

    /// Make an authenticated PATCH request with JSON body
    pub async fn patch_json_auth(&self, uri: &str, body: &Value, token: &str) -> Response {
        self.send("PATCH", uri, Some(body), Some(token)).await
    }

    /// Make an authenticated PATCH request without a body
    pub async fn patch_auth(&self, uri: &str, token: &str) -> Response {
        self.send("PATCH", uri, None, Some(token)).await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response {
        self.send("DELETE", uri, None, Some(token)).await
    }

    /// Register a fresh account and return its id and tokens
    pub async fn register(&self) -> TestUser {
        let username = unique_username();
        let body = json!({
            "username": username,
            "email": unique_email(),
            "password": TEST_PASSWORD,
            "password_confirm": TEST_PASSWORD,
        });

        let response = self.post_json("/api/auth/register", &body).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;

        TestUser {
            id: json["user"]["id"].as_str().unwrap().to_string(),
            username,
            access_token: json["access_token"].as_str().unwrap().to_string(),
            refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a room as `owner` and return its id
    pub async fn create_room(&self, owner: &TestUser, name: &str) -> String {
        let response = self
            .post_json_auth("/api/rooms", &json!({ "name": name }), &owner.access_token)
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    /// Add `user` to `room` on behalf of `actor`
    pub async fn add_member(&self, actor: &TestUser, room: &str, user: &TestUser) -> Response {
        self.post_json_auth(
            "/api/room-members",
            &json!({ "room": room, "user": user.id }),
            &actor.access_token,
        )
        .await
    }
}

/// Read a response body as JSON
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Generate a unique test email
pub fn unique_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

/// Generate a unique test username
pub fn unique_username() -> String {
    format!("user_{}", &uuid::Uuid::new_v4().to_string()[..8])
}
