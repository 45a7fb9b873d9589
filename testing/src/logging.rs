use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

pub use tracing::Level;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILE: &str = "test_automation.log";

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        source: std::io::Error,
    },
    #[error("global subscriber is already set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Logs to stderr and, when `log_file` is given, appends the same records
/// (without colors) to that file.
///
/// `RUST_LOG` overrides `max_log_level` when set.
pub fn initialize(max_log_level: Level, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(max_log_level.to_string()));
    install(filter, log_file)
}

fn install(filter: EnvFilter, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stderr()));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::LogFile {
                    path: path.display().to_string(),
                    source,
                })?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
