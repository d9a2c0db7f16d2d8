//! Tracing setup
//!
//! Console output goes to stderr so `produce` and `estimate` can be piped.
//! A daily-rotated copy lands in the configured log directory.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when RUST_LOG is unset or unparsable
pub const DEFAULT_FILTER: &str = "info,lsystem_studio=debug";

const LOG_FILE_PREFIX: &str = "lsystem_studio.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Non-blocking writer onto `<log_dir>/lsystem_studio.log.YYYY-MM-DD`
fn file_writer(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// Buffered file lines are flushed when the returned guard drops, so keep it
/// alive until the command finishes.
pub fn init_logging(log_dir: &str) -> Result<WorkerGuard> {
    let (writer, guard) = file_writer(Path::new(log_dir))?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(console)
        .with(file)
        .try_init()
        .context("a global subscriber is already installed")?;

    tracing::debug!(log_dir, "logging to file");
    Ok(guard)
}

/// Log a failed command with its full cause chain
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {
        tracing::error!(error = %format!("{:#}", $err), "command failed");
    };
    ($err:expr, $($field:tt)*) => {
        tracing::error!(error = %format!("{:#}", $err), $($field)*, "command failed");
    };
}
