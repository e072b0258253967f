//! Waitroom - Main Entry Point
//!
//! Wires the SQLite store, queue service, JSON-RPC server and admission
//! scheduler together.

mod config;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Import workspace crates
use crate::config::{DaemonConfig, LogSection};
use waitroom_api_rpc::{RpcServer, RpcServerConfig};
use waitroom_core::application::{
    shutdown_channel, AdmissionScheduler, QueueService, SchedulerConfig,
};
use waitroom_core::domain::TokenGenerator;
use waitroom_core::port::time_provider::SystemTimeProvider;
use waitroom_infra_sqlite::{create_pool, run_migrations, SqliteOrderedStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_FORMAT_ENV: &str = "WAITROOM_LOG_FORMAT";
const DEFAULT_LOG_FILTER: &str = "waitroom=info";
const LOG_FILE_PREFIX: &str = "waitroom.log";
const SCHEDULER_STOP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Install the tracing subscriber
///
/// Returns the file writer guard when a log directory is configured; it must
/// live until shutdown so buffered lines are flushed.
fn init_logging(log: &LogSection) -> Result<Option<WorkerGuard>> {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let stdout_layer = match log_format.as_str() {
        // Production: JSON structured logging
        "json" => fmt::layer().json().boxed(),
        // Development: Pretty formatting with colors
        _ => fmt::layer().pretty().boxed(),
    };

    let (file_layer, guard) = match &log.directory {
        Some(directory) => {
            let directory = shellexpand::tilde(directory).into_owned();
            let appender = tracing_appender::rolling::daily(&directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Make sure the parent directory of a file-backed database exists
fn ensure_database_dir(database_url: &str) -> Result<()> {
    if database_url.contains(":memory:") {
        return Ok(());
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::load().context("Failed to load configuration")?;

    // 2. Initialize logging
    let _log_guard = init_logging(&config.log)?;

    info!("Waitroom v{} starting...", VERSION);

    // 3. Token generation must work before any user is served
    TokenGenerator::new()
        .self_test()
        .map_err(|e| anyhow::anyhow!("Token generator unusable: {}", e))?;

    // 4. Initialize database
    let database_url = config.store.expanded_url();
    info!(database_url = %database_url, "Initializing database...");

    ensure_database_dir(&database_url)?;
    let pool = create_pool(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 5. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(SqliteOrderedStore::new(pool.clone()));
    let queues = Arc::new(QueueService::new(store.clone(), time_provider));

    // 6. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_server = RpcServer::new(RpcServerConfig::from(&config.rpc), queues.clone());
    let running = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 7. Start admission scheduler
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let scheduler = AdmissionScheduler::new(
        queues,
        store,
        SchedulerConfig::from(&config.scheduler),
    );
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    info!(rpc_addr = %running.local_addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 8. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 9. Graceful shutdown
    shutdown_tx.shutdown();
    running
        .handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(SCHEDULER_STOP_TIMEOUT, scheduler_handle).await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
