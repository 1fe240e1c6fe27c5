//! Application builder: wires router, middleware, and state into an Axum
//! app, and runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use planner_auth::{HttpKeySource, KeyCache, KeyRefresher, KeySource};
use planner_core::config::{AppConfig, DatabaseBackend};
use planner_core::error::AppError;
use planner_database::migration::run_migrations;
use planner_database::{DatabasePool, MemoryStore, Stores};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(CompressionLayer::new()),
    )
}

/// Runs the table planner server until ctrl-c or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting table planner server...");

    // ── Step 1: Stores ───────────────────────────────────────────
    let (stores, database) = match config.database.backend {
        DatabaseBackend::Postgres => {
            let database = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                run_migrations(database.pool()).await?;
            }
            (Stores::postgres(database.pool().clone()), Some(database))
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            (Stores::memory(MemoryStore::new()), None)
        }
    };

    // ── Step 2: Verification key ─────────────────────────────────
    let source: Arc<dyn KeySource> = Arc::new(HttpKeySource::new(&config.auth)?);
    info!(source = %source.describe(), "Fetching token verification key");
    let keys: Arc<KeyCache> = Arc::new(KeyRefresher::bootstrap(source.as_ref()).await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = KeyRefresher::new(
        Arc::clone(&keys),
        source,
        Duration::from_secs(config.auth.key_refresh_interval_seconds),
    );
    let refresher_handle = tokio::spawn(async move {
        refresher.run(shutdown_rx).await;
    });

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, stores, keys, database.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Table planner server listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await;

    if let Err(e) = refresher_handle.await {
        warn!(error = %e, "Key refresher task ended abnormally");
    }
    if let Some(database) = database {
        database.close().await;
    }

    served.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
    info!("Table planner server stopped");
    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
