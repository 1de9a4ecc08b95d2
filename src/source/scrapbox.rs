//! Scrapbox Page API
//!
//! Fetches pages through `GET /api/pages/{project}/{title}` with the session
//! cookie. Fetches are idempotent reads, so transport failures and 5xx answers
//! are retried with exponential backoff.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::DocumentStore;
use crate::config::ScrapboxConfig;
use crate::constants::scrapbox::{FETCH_ATTEMPTS, SESSION_COOKIE};
use crate::outline::Line;
use crate::types::{DigestError, Result};

pub struct ScrapboxStore {
    project: String,
    /// Full `Cookie` header value
    cookie: Option<SecretString>,
    api_base: Url,
    web_base: Url,
    client: reqwest::Client,
}

impl std::fmt::Debug for ScrapboxStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapboxStore")
            .field("project", &self.project)
            .field("cookie", &self.cookie.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl ScrapboxStore {
    pub fn new(config: &ScrapboxConfig) -> Result<Self> {
        let project = config
            .project
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                DigestError::Config(
                    "Scrapbox project not set. Set SCRAPBOX_PROJECT or scrapbox.project"
                        .to_string(),
                )
            })?;

        let api_base = parse_base(&config.api_base)?;
        let web_base = parse_base(&config.web_base)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DigestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            project,
            cookie: config
                .cookie
                .as_ref()
                .map(|c| SecretString::from(cookie_header(c))),
            api_base,
            web_base,
            client,
        })
    }

    fn page_url(&self, page: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["pages", self.project.as_str(), page]);
        }
        url
    }

    async fn fetch_once(&self, page: &str) -> std::result::Result<Vec<Line>, FetchError> {
        let mut request = self.client.get(self.page_url(page));
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie.expose_secret());
        }

        let response = request.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), body));
        }

        let body: PageResponse = response.json().await.map_err(FetchError::Transport)?;
        body.lines.ok_or(FetchError::MissingLines)
    }
}

#[async_trait]
impl DocumentStore for ScrapboxStore {
    async fn fetch_lines(&self, page: &str) -> Result<Vec<Line>> {
        info!("Fetching Scrapbox page {}/{}", self.project, page);

        let lines = (|| self.fetch_once(page))
            .retry(ExponentialBuilder::default().with_max_times(FETCH_ATTEMPTS - 1))
            .when(FetchError::is_retryable)
            .notify(|err, delay| warn!("Scrapbox fetch failed ({}), retrying in {:?}", err, delay))
            .await
            .map_err(|e| DigestError::fetch_failed(page, e.to_string()))?;

        debug!("Fetched {} lines", lines.len());
        Ok(lines)
    }

    fn anchor_url(&self, page: &str, anchor: &str) -> String {
        let mut url = self.web_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([self.project.as_str(), page]);
        }
        url.set_fragment(Some(anchor));
        url.to_string()
    }

    fn name(&self) -> &str {
        "scrapbox"
    }
}

/// Accept either a bare session id or a full cookie string
fn cookie_header(raw: &str) -> String {
    if raw.contains('=') {
        raw.to_string()
    } else {
        format!("{}={}", SESSION_COOKIE, raw)
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| DigestError::Config(format!("Invalid URL '{}': {}", raw, e)))
}

#[derive(Debug)]
enum FetchError {
    Transport(reqwest::Error),
    Status(u16, String),
    MissingLines,
}

impl FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status(code, _) => *code >= 500,
            Self::MissingLines => false,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request failed: {}", e),
            Self::Status(code, body) => write!(f, "HTTP {}: {}", code, body),
            Self::MissingLines => write!(f, "response has no `lines` field"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    lines: Option<Vec<Line>>,
}
