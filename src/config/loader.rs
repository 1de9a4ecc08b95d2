//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, `config.toml`)
//! 3. Project config (`.seminar-digest/config.toml`)
//! 4. Deployment environment (`SCRAPBOX_PROJECT`, `SLACK_BOT_TOKEN`, `CHANNEL_*`, ...)
//! 5. Prefixed environment (`SEMINAR_DIGEST_*`, nested with `__`)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DigestError, Result};

/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "SEMINAR_DIGEST_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → deployment env → prefixed env
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment
            .merge(Self::deployment_env())
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Self::finish(figment)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Self::finish(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(path)),
        )
    }

    fn finish(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| DigestError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Unprefixed variables used by existing deployments (CI secrets, worker env)
    fn deployment_env() -> Env {
        Env::raw()
            .filter_map(|key| {
                let upper = key.as_str().to_ascii_uppercase();
                let mapped = match upper.as_str() {
                    "SCRAPBOX_PROJECT" => "scrapbox.project".to_string(),
                    "SCRAPBOX_COOKIE" => "scrapbox.cookie".to_string(),
                    "OPENAI_API_KEY" => "llm.api_key".to_string(),
                    "SLACK_BOT_TOKEN" => "slack.bot_token".to_string(),
                    "SLACK_SIGNING_SECRET" => "slack.signing_secret".to_string(),
                    "SELECT_AUTHORS" => "audience.select_authors".to_string(),
                    other => {
                        let channel_key = other.strip_prefix("CHANNEL_")?;
                        if channel_key.is_empty() {
                            return None;
                        }
                        format!("routing.channels.{}", channel_key)
                    }
                };
                Some(mapped.into())
            })
            .lowercase(false)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (e.g. `~/.config/seminar-digest/`)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "seminar-digest").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".seminar-digest")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration (secrets are never serialized)
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| DigestError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a starter config file, globally or for the current directory
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let config_path = if global {
            Self::global_config_path().ok_or_else(|| {
                DigestError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    fn default_config() -> String {
        r#"# seminar-digest configuration
# Secrets (cookie, API key, bot token, signing secret) belong in the
# environment: SCRAPBOX_COOKIE, OPENAI_API_KEY, SLACK_BOT_TOKEN,
# SLACK_SIGNING_SECRET.

version = "1.0"

[scrapbox]
# project = "playful"

[llm]
provider = "openai"
model = "gpt-4o"
temperature = 0.2

[routing]
meta_channels = ["META", "ALL", "ZENTAI"]

[routing.channels]
# SATO = "C0123456789"
# META = "C0987654321"

[calendar]
base_date = "2025-09-29"
title_prefix = "2025後期_Playfulゼミ_Week_"

[server]
bind = "0.0.0.0:3000"
"#
        .to_string()
    }
}
