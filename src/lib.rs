//! seminar-digest - Weekly Seminar Digests for Slack
//!
//! Reads a weekly seminar page from Scrapbox, splits it into one segment per
//! presenter, summarizes each segment with an LLM and posts the result as a
//! threaded digest to the presenter's Slack channel. A small HTTP server
//! triggers runs and handles the "regenerate" button on posted digests.
//!
//! ## Quick Start
//!
//! ```ignore
//! use seminar_digest::{ConfigLoader, Services};
//!
//! let config = ConfigLoader::load()?;
//! let services = Services::from_config(&config)?;
//! let report = services.distributor().run("2025後期_Playfulゼミ_Week_3").await?;
//! ```
//!
//! ## Modules
//!
//! - [`outline`]: page lines to presenter segments
//! - [`source`]: document store (Scrapbox, in-memory)
//! - [`ai`]: LLM provider abstraction, prompts, summarizer
//! - [`chat`]: Slack Block Kit model and Web API client
//! - [`digest`]: routing, distribution and regeneration workflows
//! - [`server`]: HTTP trigger and Slack interactivity endpoint
//! - [`config`]: layered configuration

pub mod ai;
pub mod chat;
pub mod cli;
pub mod config;
pub mod constants;
pub mod digest;
pub mod outline;
pub mod server;
pub mod source;
pub mod timeout;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{DigestError, ErrorCategory, Result};

pub use ai::{LlmProvider, LlmResponse, SharedProvider, Summarizer};
pub use chat::{ChatApi, SharedChat, SlackClient};
pub use digest::{DistributionReport, Distributor, Regenerator, Services};
pub use outline::{Line, Segment};
pub use source::{DocumentStore, ScrapboxStore, SharedStore};
pub use timeout::with_timeout;
