//! Retry token carried in the regenerate button's `value`
//!
//! Decoding is strict: all five fields present and non-empty, or the request
//! is rejected. Older buttons may lack `channel`/`thread_ts`; those are filled
//! from the callback's own channel and message by [`RetryToken::resolve`],
//! which logs every fallback it takes.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{DigestError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryToken {
    /// Page title
    pub page: String,
    /// Line id of the segment heading
    pub anchor: String,
    /// Segment label, shown in the parent header
    pub author: String,
    pub channel: String,
    /// `ts` of the parent message
    pub thread_ts: String,
}

/// Where the callback came from, as reported by the interaction payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackOrigin {
    pub channel: Option<String>,
    /// `message.thread_ts` of the clicked message
    pub thread_ts: Option<String>,
    /// `message.ts` of the clicked message
    pub message_ts: Option<String>,
}

#[derive(Deserialize)]
struct PartialToken {
    page: Option<String>,
    anchor: Option<String>,
    author: Option<String>,
    channel: Option<String>,
    thread_ts: Option<String>,
}

impl RetryToken {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Strict decode; every field required and non-empty
    pub fn decode(value: &str) -> Result<Self> {
        let partial = parse(value)?;
        Ok(Self {
            page: required(partial.page, "page")?,
            anchor: required(partial.anchor, "anchor")?,
            author: required(partial.author, "author")?,
            channel: required(partial.channel, "channel")?,
            thread_ts: required(partial.thread_ts, "thread_ts")?,
        })
    }

    /// Decode, filling a missing `channel`/`thread_ts` from the callback origin
    pub fn resolve(value: &str, origin: &CallbackOrigin) -> Result<Self> {
        let partial = parse(value)?;

        let channel = match non_empty(partial.channel) {
            Some(channel) => channel,
            None => {
                let channel = required(origin.channel.clone(), "channel")?;
                warn!("Retry token has no channel, using callback channel {}", channel);
                channel
            }
        };

        let thread_ts = match non_empty(partial.thread_ts) {
            Some(ts) => ts,
            None => {
                let ts = required(
                    non_empty(origin.thread_ts.clone()).or_else(|| origin.message_ts.clone()),
                    "thread_ts",
                )?;
                warn!("Retry token has no thread_ts, using callback message {}", ts);
                ts
            }
        };

        Ok(Self {
            page: required(partial.page, "page")?,
            anchor: required(partial.anchor, "anchor")?,
            author: required(partial.author, "author")?,
            channel,
            thread_ts,
        })
    }

    /// Key identifying the thread this token regenerates
    pub fn thread_key(&self) -> String {
        format!("{}:{}", self.channel, self.thread_ts)
    }
}

fn parse(value: &str) -> Result<PartialToken> {
    serde_json::from_str(value).map_err(|e| DigestError::InvalidRetryToken(e.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| DigestError::InvalidRetryToken(format!("missing {}", field)))
}
