//! Document Store Abstraction
//!
//! The page source is the single source of truth for outline lines; nothing
//! here caches pages between calls.

mod memory;
mod scrapbox;

pub use memory::MemoryStore;
pub use scrapbox::ScrapboxStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::outline::Line;
use crate::types::Result;

/// Read access to outline pages
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ordered lines of `page`, title first.
    ///
    /// A page that cannot be read, or a response without lines, is
    /// `DigestError::FetchFailed`, never an empty page.
    async fn fetch_lines(&self, page: &str) -> Result<Vec<Line>>;

    /// Browser link to the line `anchor` of `page`
    fn anchor_url(&self, page: &str, anchor: &str) -> String;

    /// Store name for logging
    fn name(&self) -> &str;
}

pub type SharedStore = Arc<dyn DocumentStore>;
