//! CLI Common Utilities
//!
//! Shared config loading and argument resolution for command handlers.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::config::{Config, ConfigLoader};
use crate::digest::week;
use crate::types::{DigestError, Result};

/// Full resolution chain, or a single file when `--config` is given
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(DigestError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            ConfigLoader::load_from_file(path)
        }
        None => ConfigLoader::load(),
    }
}

/// Explicit page title, or this week's seminar page
pub fn resolve_page(config: &Config, page: Option<String>) -> String {
    page.map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| week::current_title(&config.calendar))
}

/// `"SATO, 田中"` -> `["SATO", "田中"]`
pub fn parse_authors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(DigestError::Io)
}
