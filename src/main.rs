/// HRMS server entry point
///
/// Initializes configuration and starts the HTTP server. The server provides:
/// - Employee directory at /api/employees/*
/// - Project and team management at /api/projects/*
/// - Task tracking at /api/tasks/*
/// - Health check at /healthz
use hrms::{config::Config, server::start_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to 0.0.0.0:5000 with the database under ./data
    let config = Config::default();

    start_server(config).await
}
