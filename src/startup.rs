//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::{Settings, StorageBackend};
use crate::infrastructure::{database, Repositories};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, logging};
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub settings: Arc<Settings>,
    /// Present only for the PostgreSQL backend; used by readiness checks.
    pub db: Option<PgPool>,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, settings: Settings) -> Self {
        Self {
            repos: Repositories::postgres(pool.clone()),
            snowflake: Arc::new(snowflake_generator(&settings)),
            settings: Arc::new(settings),
            db: Some(pool),
        }
    }

    /// State backed by a fresh in-memory store
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            repos: Repositories::in_memory(),
            snowflake: Arc::new(snowflake_generator(&settings)),
            settings: Arc::new(settings),
            db: None,
        }
    }
}

fn snowflake_generator(settings: &Settings) -> SnowflakeGenerator {
    SnowflakeGenerator::new(settings.snowflake.machine_id as u64, 0u64)
}

/// Full router with tracing and CORS layers applied
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let state = match settings.database.backend {
            StorageBackend::Postgres => {
                let db = database::create_pool(&settings.database).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&db).await?;
                    tracing::info!("Database migrations applied");
                }

                AppState::postgres(db, settings.clone())
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on shutdown");
                AppState::in_memory(settings.clone())
            }
        };

        handlers::health::init_server_start();
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
