//! Seminar Digest
//!
//! Everything between a parsed page and the chat workspace: routing,
//! summary layout, the distribution run and the regeneration cycle.

pub mod categories;
pub mod distribute;
pub mod messages;
pub mod regenerate;
pub mod retry_token;
pub mod routing;
pub mod week;

pub use categories::{CategoryBlock, split_categories};
pub use distribute::{DistributionReport, Distributor};
pub use regenerate::{RegenerationReport, Regenerator};
pub use retry_token::{CallbackOrigin, RetryToken};
pub use routing::{Route, Router};

use std::sync::Arc;
use tracing::debug;

use crate::ai::{Summarizer, create_provider};
use crate::chat::{SharedChat, SlackClient};
use crate::config::Config;
use crate::source::{ScrapboxStore, SharedStore};
use crate::types::Result;

/// Wired collaborators for one process
#[derive(Clone)]
pub struct Services {
    pub store: SharedStore,
    pub summarizer: Summarizer,
    pub chat: SharedChat,
    pub router: Router,
}

impl Services {
    /// Production wiring: Scrapbox, the configured LLM provider, Slack
    pub fn from_config(config: &Config) -> Result<Self> {
        config.require_posting()?;

        let store: SharedStore = Arc::new(ScrapboxStore::new(&config.scrapbox)?);
        let provider = create_provider(&config.llm)?;
        debug!(
            "Using {} ({}) with {}",
            provider.name(),
            provider.model(),
            store.name()
        );

        Ok(Self {
            store,
            summarizer: Summarizer::new(provider, config.llm.temperature),
            chat: Arc::new(SlackClient::new(&config.slack)?),
            router: Router::new(&config.routing, &config.audience),
        })
    }

    pub fn distributor(&self) -> Distributor {
        Distributor::new(
            self.store.clone(),
            self.summarizer.clone(),
            self.chat.clone(),
            self.router.clone(),
        )
    }

    pub fn regenerator(&self) -> Regenerator {
        Regenerator::new(
            self.store.clone(),
            self.summarizer.clone(),
            self.chat.clone(),
        )
    }
}
