//! Webhook Server
//!
//! - `POST /summarize`: start a distribution run for `{"page": ..}`
//! - `POST /slack/actions`: signed interactivity callbacks (regenerate button)
//! - `GET /health`
//!
//! Slack wants an answer within three seconds, so the callback handler only
//! verifies, acknowledges and spawns; the regeneration itself runs in the
//! background.

mod handlers;
pub mod signature;

pub use signature::SignatureVerifier;

use axum::{
    Router,
    routing::{get, post},
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::Config;
use crate::constants::server::ACK_TIMEOUT_MS;
use crate::digest::Services;
use crate::types::{DigestError, Result};

pub struct AppState {
    services: Services,
    verifier: SignatureVerifier,
    /// `channel:thread_ts` of regenerations running in this process
    in_flight: DashMap<String, Instant>,
    ack_timeout: Duration,
}

impl AppState {
    pub fn new(services: Services, verifier: SignatureVerifier) -> Self {
        Self {
            services,
            verifier,
            in_flight: DashMap::new(),
            ack_timeout: Duration::from_millis(ACK_TIMEOUT_MS),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.require_webhook()?;
        let secret = config
            .slack
            .signing_secret
            .clone()
            .ok_or_else(|| DigestError::Config("SLACK_SIGNING_SECRET is not set".to_string()))?;
        Ok(Self::new(
            Services::from_config(config)?,
            SignatureVerifier::new(secret),
        ))
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Claim on one thread; released on drop, including when the task panics
struct ThreadClaim {
    state: Arc<AppState>,
    key: String,
}

impl ThreadClaim {
    fn acquire(state: &Arc<AppState>, key: String) -> Option<Self> {
        use dashmap::mapref::entry::Entry;

        match state.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(Self {
                    state: Arc::clone(state),
                    key,
                })
            }
        }
    }
}

impl Drop for ThreadClaim {
    fn drop(&mut self) {
        if let Some((_, started)) = self.state.in_flight.remove(&self.key) {
            info!("Released {} after {:?}", self.key, started.elapsed());
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/summarize", post(handlers::summarize))
        .route("/slack/actions", post(handlers::slack_actions))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
