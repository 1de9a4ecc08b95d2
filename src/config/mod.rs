//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config file
//! 3. Project config (.seminar-digest/config.toml)
//! 4. Deployment environment variables (SCRAPBOX_*, SLACK_*, CHANNEL_*, ...)
//! 5. Prefixed environment variables (SEMINAR_DIGEST_*)
//! 6. CLI arguments (highest priority, applied by the command)

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX};
pub use types::*;
