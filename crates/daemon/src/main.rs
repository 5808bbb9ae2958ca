//! MediaFetch daemon - Main Entry Point
//! Tracks downloads in memory and serves them over JSON-RPC

mod config;
mod logging;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use config::DaemonConfig;
use mediafetch_api_rpc::{RpcHandler, RpcServer};
use mediafetch_core::application::{
    stop_channel, HistoryRetention, JobDispatcher, JobRegistry, StatusQueryService,
};
use mediafetch_core::port::id_provider::UuidProvider;
use mediafetch_core::port::time_provider::SystemTimeProvider;
use mediafetch_core::port::SettingsStore;
use mediafetch_infra_fs::JsonSettingsStore;
use mediafetch_infra_system::YtDlpExecutor;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration (before logging, so the format is known)
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    let _log_guard = logging::init(config.log_format, config.log_dir.as_deref())?;
    info!("MediaFetch daemon v{} starting...", VERSION);
    info!(
        settings = %config.settings_path.display(),
        ytdlp = %config.ytdlp_path.display(),
        grace_period_secs = config.grace_period.as_secs(),
        max_concurrent = ?config.max_concurrent,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let registry = Arc::new(JobRegistry::new(
        Arc::new(UuidProvider),
        time_provider.clone(),
    ));
    let history = Arc::new(HistoryRetention::new(config.history_capacity));
    let settings: Arc<dyn SettingsStore> = Arc::new(JsonSettingsStore::new(
        config.settings_path.clone(),
        config.default_output_dir.clone(),
    ));
    let executor =
        Arc::new(YtDlpExecutor::new(config.ytdlp_path.clone()).with_timeout(config.download_timeout));

    let dispatcher = Arc::new(JobDispatcher::new(
        registry.clone(),
        history.clone(),
        executor,
        settings.clone(),
        time_provider,
        config.dispatcher(),
    ));
    let query = Arc::new(StatusQueryService::new(registry, history.clone()));
    let output_dir = settings.output_directory();

    // 4. Start JSON-RPC server
    let handler = RpcHandler::new(dispatcher.clone(), query, settings);
    let server = RpcServer::new(config.rpc.clone(), handler)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(
        addr = %server.local_addr,
        output_dir = %output_dir.display(),
        history_capacity = history.capacity(),
        "System ready. Press Ctrl+C to shutdown"
    );

    // 5. Wait for shutdown signal
    let (stop_tx, mut stop) = stop_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received. Exiting gracefully..."),
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl+C, shutting down"),
        }
        stop_tx.stop();
    });
    stop.wait().await;

    // 6. Graceful shutdown (queued jobs fail, in-flight downloads end with the runtime)
    dispatcher.shutdown();
    server
        .handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, server.handle.stopped())
        .await
        .is_err()
    {
        warn!("RPC server did not stop in time");
    }

    info!("Shutdown complete.");
    Ok(())
}
