//! Command-line interface parsing for the Bold East Africa reader
//!
//! This module handles parsing of CLI arguments using clap. Endpoint and
//! cache settings can also come from `BOLDEAST_*` environment variables;
//! `--category` and `--article` choose the screen the reader opens on.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::app::Route;
use crate::config::{DEFAULT_API_URL, DEFAULT_STORAGE_URL};

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// Both a category and an article were requested
    #[error("--category and --article cannot be used together")]
    ConflictingStart,

    /// A start target was given but blank
    #[error("Empty value for --{0}")]
    EmptyTarget(&'static str),
}

/// Bold East Africa reader - news from the terminal
#[derive(Parser, Debug)]
#[command(name = "boldeast")]
#[command(about = "Read The Bold East Africa from your terminal")]
#[command(version)]
pub struct Cli {
    /// Base URL of the news API
    #[arg(long, env = "BOLDEAST_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL for resolving relative image paths
    #[arg(long, env = "BOLDEAST_STORAGE_URL", default_value = DEFAULT_STORAGE_URL)]
    pub storage_url: String,

    /// Directory for the persistent cache and log file
    #[arg(long, env = "BOLDEAST_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Open directly on a category feed
    ///
    /// Example: boldeast --category politics
    #[arg(long, value_name = "SLUG")]
    pub category: Option<String>,

    /// Open directly on an article, by numeric id or slug
    ///
    /// Example: boldeast --article 42
    #[arg(long, value_name = "ID_OR_SLUG")]
    pub article: Option<String>,

    /// Start offline: show cached content and skip background refreshes
    #[arg(long)]
    pub offline: bool,

    /// Log filter written to boldeast.log (e.g. "debug", "boldeast=trace")
    #[arg(long, env = "BOLDEAST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupConfig {
    /// Screen to open first
    pub route: Route,
    /// Whether to start with connectivity off
    pub offline: bool,
}

fn target(value: &str, flag: &'static str) -> Result<String, CliError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::EmptyTarget(flag));
    }
    Ok(value.to_string())
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with the initial route
    /// * `Err(CliError)` if the start flags conflict or are blank
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let route = match (&cli.category, &cli.article) {
            (Some(_), Some(_)) => return Err(CliError::ConflictingStart),
            (Some(slug), None) => Route::Category(target(slug, "category")?),
            (None, Some(ident)) => Route::Article(target(ident, "article")?),
            (None, None) => Route::Home,
        };

        Ok(StartupConfig {
            route,
            offline: cli.offline,
        })
    }
}
