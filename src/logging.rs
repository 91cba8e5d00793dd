//! File-based logging for Sift-RS
//!
//! The review screen owns the terminal, so tracing output goes to a rolling
//! file under `.logs/` instead of stdout.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "sift-rs";
/// Environment variable overriding [`DEFAULT_FILTER`]
const FILTER_ENV: &str = "SIFT_LOG";
const DEFAULT_FILTER: &str = "sift_rs=debug,rspotify=info,warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Start writing logs to `.logs/sift-rs.YYYY-MM-DD.log`.
///
/// Session and catalog events log at DEBUG, each page and decision at INFO.
/// `SIFT_LOG` takes an `EnvFilter` directive to change that.
///
/// Buffered lines are flushed when the returned guard drops, so `main` holds
/// it until the terminal is restored.
pub fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_dir = Path::new(LOG_DIR);
    std::fs::create_dir_all(log_dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()?;

    tracing::info!(dir = LOG_DIR, "Logging initialized");
    Ok(guard)
}

/// Log the outcome of a catalog call
#[macro_export]
macro_rules! log_catalog_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "Catalog call succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Catalog call failed"),
        }
    };
}

/// Log the start of a catalog call with its parameters
#[macro_export]
macro_rules! log_catalog_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Catalog call started");
    };
}
