/// Server setup and initialization
///
/// Wires together the database, storage handles and HTTP routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::{create_employee_routes, create_project_routes, create_task_routes, AppState},
    config::Config,
    db,
};
use anyhow::Result;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt::MakeWriter, util::SubscriberInitExt, EnvFilter};

/// Create the main Axum application with all routes
///
/// Opens the database (creating the schema on first start) and mounts the
/// employee, project and task APIs on a single shared state.
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Using data directory: {}", config.database.data_dir);
    let pool = db::connect(&config.database).await?;

    tracing::info!("🏗️ Creating application state");
    let app_state = AppState::new(pool);

    tracing::info!("📡 Creating HTTP router with all endpoints");
    let app = Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Employee directory
        .merge(create_employee_routes())
        // Projects and team membership
        .merge(create_project_routes())
        // Tasks and comments
        .merge(create_task_routes())
        .with_state(app_state);

    tracing::info!("✅ Application initialized successfully");

    Ok(app)
}

/// Start the HTTP server with the given configuration
///
/// Logging honours `RUST_LOG` and falls back to `info`. The server stops
/// accepting connections on Ctrl-C and drains in-flight requests.
pub async fn start_server(config: Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    log_subscriber(filter, std::io::stdout).init();

    tracing::info!("Starting HRMS server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

/// Log format: level and thread id on every line, no module target
fn log_subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .finish()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
