//! Group view for inspection output.
//!
//! Buckets each segment's lines by `[* G1]`..`[* G6]` markers. Lines before a
//! segment's first marker are discarded. Only the `inspect` command uses this.

use std::collections::BTreeMap;

use serde::Serialize;

use super::heading::{self, Heading};
use super::Line;
use crate::constants::outline::META_LABEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedPresenter {
    pub label: String,
    pub anchor: String,
    /// `G1`..`G6`, sorted by name
    pub groups: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
struct GroupState {
    closed: Vec<GroupedPresenter>,
    open: Option<GroupedPresenter>,
    group: Option<String>,
}

impl GroupState {
    fn step(mut self, line: &Line) -> Self {
        if let Some(h) = heading::classify(line) {
            let label = match h {
                Heading::Speaker(name) => name,
                Heading::Meta => META_LABEL,
            };
            self.closed.extend(self.open.take());
            self.open = Some(GroupedPresenter {
                label: label.to_string(),
                anchor: line.id.clone(),
                groups: BTreeMap::new(),
            });
            self.group = None;
            return self;
        }

        let Some(presenter) = self.open.as_mut() else {
            return self;
        };

        if let Some(n) = heading::group_marker(line) {
            let name = format!("G{}", n);
            presenter.groups.entry(name.clone()).or_default();
            self.group = Some(name);
        } else if let Some(group) = &self.group
            && let Some(bucket) = presenter.groups.get_mut(group)
        {
            bucket.push(line.raw().to_string());
        }
        self
    }

    fn finish(mut self) -> Vec<GroupedPresenter> {
        self.closed.extend(self.open.take());
        self.closed
    }
}

/// Parse a page into grouped presenters. `lines[0]` is the title.
pub fn parse_groups(lines: &[Line]) -> Vec<GroupedPresenter> {
    lines
        .iter()
        .skip(1)
        .fold(GroupState::default(), GroupState::step)
        .finish()
}
