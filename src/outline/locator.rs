//! Segment Locator
//!
//! Re-extracts one segment's raw text from the current page using only the
//! anchor remembered in a retry token. The parse that produced the anchor is
//! not needed.

use tracing::debug;

use super::{Line, heading};
use crate::source::DocumentStore;
use crate::types::{DigestError, Result};

/// Text of the section opened by `anchor`, or `None` when the anchor is gone.
///
/// Collects the indentation-stripped text of every line after the anchor up
/// to (excluding) the next segment heading.
pub fn locate_in(lines: &[Line], anchor: &str) -> Option<String> {
    let start = lines.iter().position(|l| l.id == anchor)?;
    let section: Vec<&str> = lines[start + 1..]
        .iter()
        .take_while(|l| heading::classify(l).is_none())
        .map(Line::raw)
        .collect();
    Some(section.join("\n"))
}

/// Fetch `page` and locate the section opened by `anchor`.
///
/// Fails with [`DigestError::StaleAnchor`] when the page no longer has that
/// line; the caller reports this instead of summarizing stale text.
pub async fn locate(store: &dyn DocumentStore, page: &str, anchor: &str) -> Result<String> {
    let lines = store.fetch_lines(page).await?;
    debug!("Locating anchor {} among {} lines", anchor, lines.len());

    locate_in(&lines, anchor).ok_or_else(|| DigestError::StaleAnchor {
        page: page.to_string(),
        anchor: anchor.to_string(),
    })
}
