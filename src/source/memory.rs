//! In-memory page store.
//!
//! Backs offline inspection of exported pages and the test suites.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use serde::Deserialize;

use super::DocumentStore;
use crate::outline::Line;
use crate::types::{DigestError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: RwLock<HashMap<String, Vec<Line>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, title: impl Into<String>, lines: Vec<Line>) -> Self {
        self.set_page(title, lines);
        self
    }

    /// Replace a page, e.g. to simulate an edit between parse and retry
    pub fn set_page(&self, title: impl Into<String>, lines: Vec<Line>) {
        if let Ok(mut pages) = self.pages.write() {
            pages.insert(title.into(), lines);
        }
    }

    /// Load a page export (`{"title": .., "lines": [{id, text}, ..]}`)
    pub fn from_export(path: &Path) -> Result<(String, Self)> {
        #[derive(Deserialize)]
        struct Export {
            title: String,
            lines: Vec<Line>,
        }

        let content = std::fs::read_to_string(path)?;
        let export: Export = serde_json::from_str(&content)?;
        let store = Self::new().with_page(export.title.clone(), export.lines);
        Ok((export.title, store))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_lines(&self, page: &str) -> Result<Vec<Line>> {
        let pages = self
            .pages
            .read()
            .map_err(|_| DigestError::fetch_failed(page, "page store lock poisoned"))?;
        pages
            .get(page)
            .cloned()
            .ok_or_else(|| DigestError::fetch_failed(page, "no such page"))
    }

    fn anchor_url(&self, page: &str, anchor: &str) -> String {
        format!("memory://{}#{}", page, anchor)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
