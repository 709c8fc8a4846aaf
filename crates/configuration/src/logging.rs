//! Global tracing subscriber set-up.

use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::{prelude::*, registry};

const LOG_FILE_PREFIX: &str = "amu-tracker.log";

/// Installs the global subscriber: stdout always, plus a daily-rolling file
/// when `logging.directory` is configured.
///
/// The returned guard flushes the file writer on drop, so the caller must keep
/// it alive for the lifetime of the process.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse(std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone()))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    let stdout_layer = layer().with_writer(std::io::stdout).with_target(true);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = layer().with_writer(writer).with_ansi(false);
            (Some(file_layer), Some(guard))
        }
        None => (None, None),
    };

    registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    Ok(guard)
}
