//! Segment routing: alias table, audience filter, channel lookup

use std::collections::BTreeMap;
use tracing::info;

use crate::config::{AudienceConfig, RoutingConfig};
use crate::outline::{Segment, SegmentKind};
use crate::types::{DigestError, Result};

/// Where a segment goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Presenter { key: String, channel: String },
    Meta { channel: String },
    /// Outside the active audience restriction
    Filtered,
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    aliases: BTreeMap<String, String>,
    channels: BTreeMap<String, String>,
    meta_channels: Vec<String>,
    audience: Vec<String>,
}

impl Router {
    pub fn new(routing: &RoutingConfig, audience: &AudienceConfig) -> Self {
        Self {
            aliases: routing.aliases.clone(),
            channels: routing.channels.clone(),
            meta_channels: routing.meta_channels.clone(),
            audience: audience.select_authors.clone(),
        }
    }

    /// Replace the audience restriction; an empty list admits everyone
    pub fn with_audience(mut self, audience: Vec<String>) -> Self {
        self.audience = audience;
        self
    }

    pub fn alias(&self, label: &str) -> Option<&str> {
        self.aliases.get(label).map(String::as_str)
    }

    pub fn channel(&self, key: &str) -> Option<&str> {
        self.channels
            .get(key)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    /// First configured channel of the meta priority list
    pub fn meta_channel(&self) -> Option<&str> {
        self.meta_channels.iter().find_map(|key| self.channel(key))
    }

    /// Audience check against the raw label or its canonical key
    pub fn admits(&self, label: &str, key: &str) -> bool {
        self.audience.is_empty() || self.audience.iter().any(|a| a == label || a == key)
    }

    pub fn route(&self, segment: &Segment) -> Result<Route> {
        if segment.kind() == SegmentKind::Meta {
            return self
                .meta_channel()
                .map(|channel| Route::Meta {
                    channel: channel.to_string(),
                })
                .ok_or_else(|| {
                    DigestError::NoDestination(format!(
                        "meta segment (tried {})",
                        self.meta_channels
                            .iter()
                            .map(|k| format!("CHANNEL_{}", k))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ))
                });
        }

        let key = self
            .alias(&segment.label)
            .ok_or_else(|| DigestError::UnknownPresenter(segment.label.clone()))?;

        if !self.admits(&segment.label, key) {
            info!("Filtered: {} ({})", segment.label, key);
            return Ok(Route::Filtered);
        }

        let channel = self
            .channel(key)
            .ok_or_else(|| DigestError::NoDestination(format!("CHANNEL_{}", key)))?;

        Ok(Route::Presenter {
            key: key.to_string(),
            channel: channel.to_string(),
        })
    }
}
