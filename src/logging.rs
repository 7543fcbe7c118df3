//! Log file setup
//!
//! The terminal belongs to the TUI, so logs go to `boldeast.log` in the cache
//! directory.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "boldeast.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid log filter '{0}'")]
    Filter(String),

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Parses a log filter, honouring `RUST_LOG` over `level`
pub fn filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|_| LoggingError::Filter(level.to_string()))
}

/// Installs a global subscriber appending to `dir/boldeast.log`
pub fn init(level: &str, dir: &Path) -> Result<PathBuf, LoggingError> {
    let path = dir.join(LOG_FILE);
    let io_error = |source| LoggingError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_error)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(io_error)?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))?;

    Ok(path)
}
