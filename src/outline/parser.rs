//! Outline Parser
//!
//! Folds the page lines (title excluded) into an ordered list of segments.
//! Every depth-0 heading closes the open segment and opens a new one anchored
//! to the heading's line id. Lines before the first heading are dropped.

use super::heading::{self, Heading};
use super::{Line, Segment};
use crate::constants::outline::META_LABEL;

/// Accumulator threaded through the fold
#[derive(Debug, Default)]
struct ParseState {
    closed: Vec<Segment>,
    open: Option<Segment>,
}

impl ParseState {
    fn step(mut self, line: &Line) -> Self {
        match heading::classify(line) {
            Some(h) => {
                let label = match h {
                    Heading::Speaker(name) => name,
                    Heading::Meta => META_LABEL,
                };
                self.closed.extend(self.open.take());
                self.open = Some(Segment::new(label, line.id.clone()));
            }
            None => {
                if let Some(segment) = self.open.as_mut() {
                    segment.body.push(line.raw().to_string());
                }
            }
        }
        self
    }

    fn finish(mut self) -> Vec<Segment> {
        self.closed.extend(self.open.take());
        self.closed
    }
}

/// Parse a page into segments. `lines[0]` is the page title and is skipped.
pub fn parse(lines: &[Line]) -> Vec<Segment> {
    lines
        .iter()
        .skip(1)
        .fold(ParseState::default(), ParseState::step)
        .finish()
}
