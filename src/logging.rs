use std::io;
use std::path::Path;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use clonesync_core::{RunContext, TransferOptions};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "CLONESYNC_LOG";

/// File name suffix of the run log.
pub const RUN_LOG_NAME: &str = "clonesync.log.txt";

/// Log directory used before a configuration has been loaded.
pub const DEFAULT_LOG_DIR: &str = "log";

/// Install the stdout and run-log layers.
///
/// The returned guard flushes the run log when dropped and must be held
/// until the process exits.
pub fn init_logger(ctx: &RunContext) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(ctx.log_dir())?;

    let filter_layer =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = ctx.artifact_path(RUN_LOG_NAME);
    let file_name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| RUN_LOG_NAME.into());
    let file_appender = tracing_appender::rolling::never(ctx.log_dir(), file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stdout)
                .compact()
                .with_target(false)
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter_layer)
        .try_init()
        .map_err(io::Error::other)?;

    info!("Logging to {}", log_path.display());

    Ok(guard)
}

/// Record an error raised before the configured log directory is known.
///
/// Writes a run log in `log_dir` holding the message and flushes it.
pub fn log_startup_error(log_dir: &Path, message: &str) -> io::Result<()> {
    let ctx = RunContext::new(log_dir, TransferOptions::default());
    let guard = init_logger(&ctx)?;
    error!("{}", message);
    drop(guard);
    Ok(())
}
