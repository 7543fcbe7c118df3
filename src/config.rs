//! Runtime settings resolved from the command line and environment

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::cli::Cli;

pub const DEFAULT_API_URL: &str = "https://api.theboldeastafrica.com/api";
pub const DEFAULT_STORAGE_URL: &str = "https://api.theboldeastafrica.com/storage";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A base URL did not parse or used an unsupported scheme
    #[error("Invalid {name} '{value}': {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Validated settings for one run of the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API base URL without a trailing slash
    pub api_base_url: String,
    /// Storage base URL without a trailing slash
    pub storage_base_url: String,
    /// Override for the cache directory; `None` means the XDG default
    pub cache_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: base_url("API URL", &cli.api_url)?,
            storage_base_url: base_url("storage URL", &cli.storage_url)?,
            cache_dir: cli.cache_dir.clone(),
            log_level: cli.log_level.clone(),
        })
    }
}

fn base_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason,
    };

    let parsed = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}
