//! Slack Web API client
//!
//! Thin JSON-over-HTTPS adapter for the four methods the digest uses.
//! Slack reports failures in-band (`{"ok": false, "error": "..."}`), which
//! become `DigestError::Chat`. HTTP 429 is retried with exponential backoff;
//! a rate-limited call had no effect, so replaying it is safe.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

use super::{Block, ChatApi, ChatMessage};
use crate::config::SlackConfig;
use crate::constants::slack::{FALLBACK_TEXT, RATE_LIMIT_ATTEMPTS, REPLIES_LIMIT};
use crate::types::{DigestError, Result};

pub struct SlackClient {
    token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let token = config
            .bot_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DigestError::Config("SLACK_BOT_TOKEN is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DigestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            token: SecretString::from(token),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn send_once(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<SlackResponse, CallError> {
        let response = request
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(CallError::Transport)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CallError::RateLimited);
        }
        if !status.is_success() {
            return Err(CallError::Status(status.as_u16()));
        }

        response.json().await.map_err(CallError::Transport)
    }

    /// Run one Web API call, retrying only on 429, and check `ok`
    async fn call<F>(&self, method: &str, build: F) -> Result<SlackResponse>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let response = (|| self.send_once(build()))
            .retry(ExponentialBuilder::default().with_max_times(RATE_LIMIT_ATTEMPTS - 1))
            .when(CallError::is_rate_limited)
            .notify(|_, delay| warn!("Slack {} rate limited, retrying in {:?}", method, delay))
            .await
            .map_err(|e| DigestError::chat(method, e.to_string()))?;

        if !response.ok {
            let reason = response.error.unwrap_or_else(|| "unknown_error".to_string());
            return Err(DigestError::chat(method, reason));
        }
        debug!("Slack {} ok", method);
        Ok(response)
    }

    async fn post_json(&self, method: &str, body: Value) -> Result<SlackResponse> {
        let url = self.url(method);
        self.call(method, || self.client.post(&url).json(&body)).await
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    async fn post_message(
        &self,
        channel: &str,
        blocks: &[Block],
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let mut body = json!({
            "channel": channel,
            "blocks": blocks,
            "text": FALLBACK_TEXT,
        });
        if let Some(thread_ts) = thread_ts {
            body["thread_ts"] = json!(thread_ts);
        }

        self.post_json("chat.postMessage", body)
            .await?
            .ts
            .ok_or_else(|| DigestError::chat("chat.postMessage", "response has no ts"))
    }

    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        blocks: &[Block],
        text: &str,
    ) -> Result<()> {
        let body = json!({
            "channel": channel,
            "ts": ts,
            "blocks": blocks,
            "text": text,
        });
        self.post_json("chat.update", body).await.map(|_| ())
    }

    async fn delete_message(&self, channel: &str, ts: &str) -> Result<()> {
        let body = json!({ "channel": channel, "ts": ts });
        self.post_json("chat.delete", body).await.map(|_| ())
    }

    async fn list_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ChatMessage>> {
        let method = "conversations.replies";
        let url = self.url(method);
        let limit = REPLIES_LIMIT.to_string();
        let response = self
            .call(method, || {
                self.client.get(&url).query(&[
                    ("channel", channel),
                    ("ts", thread_ts),
                    ("limit", limit.as_str()),
                ])
            })
            .await?;

        Ok(response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(RawMessage::decode)
            .collect())
    }
}

#[derive(Debug)]
enum CallError {
    Transport(reqwest::Error),
    Status(u16),
    RateLimited,
}

impl CallError {
    fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request failed: {}", e),
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::RateLimited => write!(f, "rate limited"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    messages: Option<Vec<RawMessage>>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    ts: String,
    #[serde(default)]
    blocks: Vec<Value>,
}

impl RawMessage {
    /// Blocks are decoded one by one; a block this crate cannot read becomes `Other`
    fn decode(self) -> ChatMessage {
        let blocks = self
            .blocks
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap_or(Block::Other))
            .collect();
        ChatMessage {
            ts: self.ts,
            blocks,
        }
    }
}
