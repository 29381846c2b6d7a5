pub mod api;
pub mod auth;
pub mod census;
pub mod config;
pub mod core_state;
pub mod db;
pub mod flow;
pub mod lean;
pub mod models;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Boot the ward service: open the store, seed the fixed accounts,
/// serve the API, and drain the audit buffer on the way out.
pub async fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| format!("Cannot create data directory {}: {e}", data_dir.display()))?;

    let core = Arc::new(core_state::CoreState::new(config::db_path()));

    // Boot sweep: migrate, make sure the fixed accounts exist, prune the
    // audit trail past retention.
    {
        let conn = core
            .open_db()
            .map_err(|e| format!("Cannot open database: {e}"))?;
        auth::seed_default_accounts(&conn).map_err(|e| format!("Cannot seed accounts: {e}"))?;
    }
    core.flush_and_prune_audit()
        .map_err(|e| format!("Audit boot sweep failed: {e}"))?;

    let mut server = api::start_api_server(core.clone(), config::bind_addr()).await?;
    tracing::info!(addr = %server.addr, "Ward service ready");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Cannot listen for shutdown signal: {e}"))?;

    tracing::info!("Shutdown requested");
    server.shutdown();
    core.flush_and_prune_audit()
        .map_err(|e| format!("Audit final flush failed: {e}"))?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
