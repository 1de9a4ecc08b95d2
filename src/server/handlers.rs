use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{AppState, ThreadClaim};
use crate::constants::slack::RETRY_ACTION_ID;
use crate::digest::{CallbackOrigin, RetryToken};
use crate::timeout::with_timeout;

const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const SIGNATURE_HEADER: &str = "x-slack-signature";

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "in_flight": state.in_flight() }))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    page: Option<String>,
}

/// Start a distribution run in the background and answer at once
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let page = body
        .ok()
        .and_then(|Json(req)| req.page)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let Some(page) = page else {
        return (StatusCode::BAD_REQUEST, "Missing page title").into_response();
    };

    let distributor = state.services.distributor();
    let target = page.clone();
    tokio::spawn(async move {
        match distributor.run(&target).await {
            Ok(report) if report.has_failures() => {
                warn!("Run for '{}' finished with {} failures", target, report.failed.len())
            }
            Ok(report) => info!("Run for '{}' posted {} segments", target, report.posted.len()),
            Err(e) => error!("Run for '{}' aborted: {}", target, e),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted", "page": page })),
    )
        .into_response()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct InteractionPayload {
    #[serde(default)]
    actions: Vec<ActionRef>,
    channel: Option<IdRef>,
    message: Option<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct ActionRef {
    action_id: String,
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    ts: Option<String>,
    thread_ts: Option<String>,
}

impl InteractionPayload {
    fn origin(&self) -> CallbackOrigin {
        CallbackOrigin {
            channel: self.channel.as_ref().map(|c| c.id.clone()),
            thread_ts: self.message.as_ref().and_then(|m| m.thread_ts.clone()),
            message_ts: self.message.as_ref().and_then(|m| m.ts.clone()),
        }
    }
}

/// Interactivity endpoint: verify, decode, acknowledge, spawn
pub async fn slack_actions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.verifier.verify(
        header(&headers, TIMESTAMP_HEADER),
        header(&headers, SIGNATURE_HEADER),
        &body,
        chrono::Utc::now().timestamp(),
    ) {
        warn!("Rejected callback: {}", e);
        return (StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
    }

    let Some(raw) = url::form_urlencoded::parse(&body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
    else {
        return (StatusCode::BAD_REQUEST, "Missing payload").into_response();
    };

    let payload: InteractionPayload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Unreadable interaction payload: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload").into_response();
        }
    };

    let Some(value) = payload
        .actions
        .iter()
        .find(|a| a.action_id == RETRY_ACTION_ID)
        .and_then(|a| a.value.as_deref())
    else {
        info!("Ignoring interaction without a regenerate action");
        return StatusCode::OK.into_response();
    };

    let token = match RetryToken::resolve(value, &payload.origin()) {
        Ok(token) => token,
        Err(e) => {
            warn!("Rejected callback: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let Some(claim) = ThreadClaim::acquire(&state, token.thread_key()) else {
        warn!(
            "Regeneration already running for {}, ignoring",
            token.thread_key()
        );
        return StatusCode::OK.into_response();
    };

    let regenerator = state.services.regenerator();
    if let Err(e) = with_timeout(
        state.ack_timeout,
        regenerator.acknowledge(&token),
        "acknowledge",
    )
    .await
    {
        warn!("Acknowledge failed for {}: {}", token.thread_key(), e);
    }

    tokio::spawn(async move {
        let _claim = claim;
        match regenerator.run(&token).await {
            Ok(report) => info!(
                "Regenerated {} ({} replaced, {} posted)",
                token.thread_key(),
                report.deleted,
                report.reposted
            ),
            Err(e) => error!("Regeneration for {} failed: {}", token.thread_key(), e),
        }
    });

    StatusCode::OK.into_response()
}
