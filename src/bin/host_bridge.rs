//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin,
//! routes them to the planner, and writes `ResponseEnvelope` lines to stdout.
//!
//! All tracing/diagnostic output goes to stderr (and optionally a daily log
//! file) so that stdout remains a clean JSON protocol channel.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use weekplan::config::PlannerConfig;
use weekplan::host::handler::CommandRouter;
use weekplan::host::stdio::run_stdio_bridge;
use weekplan::planner::Planner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var_os("WEEKPLAN_CONFIG")
        .map(Into::into)
        .unwrap_or_else(PlannerConfig::default_config_path);
    let config = PlannerConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?;

    let _log_guard = init_tracing(&config);

    tracing::info!(config = %config_path.display(), "weekplan-host starting");

    let planner = Planner::open(&config).map_err(|e| {
        tracing::error!(error = %e, "task store unavailable");
        anyhow::anyhow!("weekplan-host cannot open its database: {e}")
    })?;
    if let Some(path) = planner.db_path() {
        tracing::info!(db = %path.display(), "task store ready");
    }

    run_stdio_bridge(Arc::new(CommandRouter::new(planner)))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "weekplan-host exited with error");
            anyhow::anyhow!("weekplan-host failed: {e}")
        })?;

    tracing::info!("weekplan-host shut down cleanly");
    Ok(())
}

/// Stderr logging plus an optional daily-rotated file. The returned guard
/// must live until shutdown so buffered file output is flushed.
fn init_tracing(config: &PlannerConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !config.logging.file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    }

    let appender =
        tracing_appender::rolling::daily(weekplan::planner_dirs::logs_dir(), "weekplan-host.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();
    Some(guard)
}
