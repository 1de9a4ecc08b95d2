//! Outline Segmentation
//!
//! Turns the flat, tab-indented line list of a seminar page into presenter
//! segments anchored to the id of their heading line.
//!
//! ## Modules
//!
//! - `heading`: heading grammar (speaker, meta, group markers)
//! - `parser`: line list to [`Segment`]s
//! - `locator`: re-extract one segment's text by anchor
//! - `groups`: G1..G6 bucketing for the inspection view

pub mod groups;
pub mod heading;
pub mod locator;
pub mod parser;

pub use groups::{GroupedPresenter, parse_groups};
pub use heading::Heading;
pub use locator::{locate, locate_in};
pub use parser::parse;

use serde::{Deserialize, Serialize};

use crate::constants::outline::{INDENT, META_LABEL};

// =============================================================================
// Line
// =============================================================================

/// One record of the source page, as returned by the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Stable line id, used as the segment anchor
    pub id: String,
    /// Raw text including leading indentation
    pub text: String,
}

impl Line {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Number of leading indentation markers
    pub fn depth(&self) -> usize {
        self.text.chars().take_while(|c| *c == INDENT).count()
    }

    /// Text with leading indentation stripped
    pub fn raw(&self) -> &str {
        self.text.trim_start_matches(INDENT)
    }
}

// =============================================================================
// Segment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Feedback block for one named presenter
    Presenter,
    /// Reserved meta-notes block
    Meta,
}

/// Contiguous run of lines attributed to one presenter or the meta topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Presenter name, or [`META_LABEL`]
    pub label: String,
    /// Id of the heading line that opened the segment
    pub anchor: String,
    /// Indentation-stripped body lines, heading excluded
    pub body: Vec<String>,
}

impl Segment {
    pub fn new(label: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            anchor: anchor.into(),
            body: Vec::new(),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        if self.label == META_LABEL {
            SegmentKind::Meta
        } else {
            SegmentKind::Presenter
        }
    }

    pub fn is_meta(&self) -> bool {
        self.kind() == SegmentKind::Meta
    }

    /// Body joined the way it is sent to the model
    pub fn text(&self) -> String {
        self.body.join("\n")
    }

    /// True when the body has no non-blank line
    pub fn is_blank(&self) -> bool {
        self.body.iter().all(|l| l.trim().is_empty())
    }
}
