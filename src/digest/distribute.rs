//! Distribution Engine
//!
//! Walks the segments of one page in order and posts, per presenter, a
//! parent summary, the regenerate control and the category replies. Meta
//! notes become a single message in the meta channel.
//!
//! A failing segment never stops the run: routing misses are warn-and-skip,
//! summarization and chat failures are logged and counted.

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::categories::normalize_meta;
use super::messages::{control_blocks, meta_blocks, parent_blocks, post_categories};
use super::retry_token::RetryToken;
use super::routing::{Route, Router};
use crate::ai::Summarizer;
use crate::chat::SharedChat;
use crate::outline::{Segment, parse};
use crate::source::SharedStore;
use crate::types::{DigestError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct PostedSegment {
    pub label: String,
    pub channel: String,
    pub parent_ts: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentIssue {
    pub label: String,
    pub reason: String,
}

/// Per-run outcome, one entry per segment
#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionReport {
    pub page: String,
    pub posted: Vec<PostedSegment>,
    /// Outside the audience restriction
    pub filtered: Vec<String>,
    /// Warn-and-skip: unknown presenter, no channel, empty body
    pub skipped: Vec<SegmentIssue>,
    /// Summarization or chat failures
    pub failed: Vec<SegmentIssue>,
}

impl DistributionReport {
    pub fn total(&self) -> usize {
        self.posted.len() + self.filtered.len() + self.skipped.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

enum Outcome {
    Posted { channel: String, parent_ts: String },
    Filtered,
}

#[derive(Clone)]
pub struct Distributor {
    store: SharedStore,
    summarizer: Summarizer,
    chat: SharedChat,
    router: Router,
}

impl Distributor {
    pub fn new(
        store: SharedStore,
        summarizer: Summarizer,
        chat: SharedChat,
        router: Router,
    ) -> Self {
        Self {
            store,
            summarizer,
            chat,
            router,
        }
    }

    /// Fetch, parse and distribute one page. Only a failed fetch aborts.
    pub async fn run(&self, page: &str) -> Result<DistributionReport> {
        let lines = self.store.fetch_lines(page).await?;
        let segments = parse(&lines);
        info!(
            "Page '{}': {} lines, {} segments",
            page,
            lines.len(),
            segments.len()
        );
        Ok(self.distribute(page, &segments).await)
    }

    pub async fn distribute(&self, page: &str, segments: &[Segment]) -> DistributionReport {
        let mut report = DistributionReport {
            page: page.to_string(),
            ..Default::default()
        };

        for segment in segments {
            let label = segment.label.clone();
            match self.deliver(page, segment).await {
                Ok(Outcome::Posted { channel, parent_ts }) => {
                    info!("Posted {} to {}", label, channel);
                    report.posted.push(PostedSegment {
                        label,
                        channel,
                        parent_ts,
                    });
                }
                Ok(Outcome::Filtered) => report.filtered.push(label),
                Err(e) if e.is_segment_skip() => {
                    warn!("Skipping {}: {}", label, e);
                    report.skipped.push(SegmentIssue {
                        label,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("Failed {}: {}", label, e);
                    report.failed.push(SegmentIssue {
                        label,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Distribution done: {} posted, {} filtered, {} skipped, {} failed",
            report.posted.len(),
            report.filtered.len(),
            report.skipped.len(),
            report.failed.len()
        );
        report
    }

    #[instrument(skip(self, page, segment), fields(label = %segment.label, anchor = %segment.anchor))]
    async fn deliver(&self, page: &str, segment: &Segment) -> Result<Outcome> {
        let route = self.router.route(segment)?;
        if route == Route::Filtered {
            return Ok(Outcome::Filtered);
        }
        if segment.is_blank() {
            return Err(DigestError::EmptySegment(segment.label.clone()));
        }

        let url = self.store.anchor_url(page, &segment.anchor);
        let text = segment.text();

        match route {
            Route::Meta { channel } => {
                let bullets = normalize_meta(&self.summarizer.summarize_meta(&text).await?);
                let ts = self
                    .chat
                    .post_message(&channel, &meta_blocks(&bullets, &url), None)
                    .await?;
                Ok(Outcome::Posted {
                    channel,
                    parent_ts: ts,
                })
            }
            Route::Presenter { channel, .. } => {
                let overall = self.summarizer.summarize_overall(&text).await?;
                let parent_ts = self
                    .chat
                    .post_message(&channel, &parent_blocks(&segment.label, &overall, &url), None)
                    .await?;

                let token = RetryToken {
                    page: page.to_string(),
                    anchor: segment.anchor.clone(),
                    author: segment.label.clone(),
                    channel: channel.clone(),
                    thread_ts: parent_ts.clone(),
                };
                self.chat
                    .post_message(&channel, &control_blocks(&token.encode()?), Some(&parent_ts))
                    .await?;

                let answer = self.summarizer.summarize_categories(&text).await?;
                post_categories(self.chat.as_ref(), &channel, &parent_ts, &answer).await?;

                Ok(Outcome::Posted { channel, parent_ts })
            }
            Route::Filtered => Ok(Outcome::Filtered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ScriptedProvider;
    use crate::chat::{Block, Element, MemoryChat};
    use crate::config::{AudienceConfig, RoutingConfig};
    use crate::outline::Line;
    use crate::source::MemoryStore;
    use crate::types::{ErrorCategory, LlmError};
    use std::sync::Arc;

    const PAGE: &str = "Week_3";

    fn page() -> Vec<Line> {
        vec![
            Line::new("t", PAGE),
            Line::new("h1", "[** 🎤佐藤] 発表"),
            Line::new("b1", "構成が良い"),
            Line::new("h2", "[** 🎤田中] 発表"),
            Line::new("b2", "\t図が小さい"),
            Line::new("h3", "> メタなこと"),
            Line::new("b3", "来週は休み"),
        ]
    }

    fn routing() -> RoutingConfig {
        let mut routing = RoutingConfig::default();
        routing.channels.insert("SATO".into(), "C-SATO".into());
        routing.channels.insert("TANAKA".into(), "C-TANAKA".into());
        routing.channels.insert("META".into(), "C-META".into());
        routing
    }

    fn distributor(
        provider: ScriptedProvider,
        audience: Vec<String>,
    ) -> (Distributor, Arc<MemoryChat>) {
        let store = Arc::new(MemoryStore::new().with_page(PAGE, page()));
        let chat = Arc::new(MemoryChat::new());
        let router = Router::new(&routing(), &AudienceConfig::default()).with_audience(audience);
        let summarizer = Summarizer::new(Arc::new(provider), 0.2);
        (
            Distributor::new(store, summarizer, chat.clone(), router),
            chat,
        )
    }

    #[tokio::test]
    async fn test_full_run() {
        let (distributor, chat) = distributor(ScriptedProvider::echo_kind(), vec![]);
        let report = distributor.run(PAGE).await.unwrap();

        assert_eq!(report.posted.len(), 3);
        assert!(report.skipped.is_empty() && report.failed.is_empty());

        let parents = chat.top_level("C-SATO");
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].blocks[1].text(), Some("全体要約"));

        let replies = chat.replies("C-SATO", &parents[0].ts);
        assert_eq!(replies.len(), 6);
        assert!(matches!(replies[0].blocks[0], Block::Actions { .. }));
        assert_eq!(replies[1].blocks[0].text(), Some("*1) よかった点*"));

        let meta = chat.top_level("C-META");
        assert_eq!(meta.len(), 1);
        assert_eq!(meta[0].blocks[1].text(), Some("• 連絡事項\n• 次回の担当"));
        assert!(chat.replies("C-META", &meta[0].ts).is_empty());
    }

    #[tokio::test]
    async fn test_control_carries_token() {
        let (distributor, chat) = distributor(ScriptedProvider::echo_kind(), vec![]);
        distributor.run(PAGE).await.unwrap();

        let parent = &chat.top_level("C-TANAKA")[0];
        let control = &chat.replies("C-TANAKA", &parent.ts)[0];
        let Block::Actions { elements, .. } = &control.blocks[0] else {
            panic!("control is not an actions block");
        };
        let Element::Button { value, .. } = &elements[0] else {
            panic!("no button");
        };
        let token = RetryToken::decode(value).unwrap();
        assert_eq!(token.page, PAGE);
        assert_eq!(token.anchor, "h2");
        assert_eq!(token.author, "田中");
        assert_eq!(token.channel, "C-TANAKA");
        assert_eq!(token.thread_ts, parent.ts);
    }

    #[tokio::test]
    async fn test_audience_filter() {
        let (distributor, chat) = distributor(ScriptedProvider::echo_kind(), vec!["SATO".into()]);
        let report = distributor.run(PAGE).await.unwrap();

        assert_eq!(report.filtered, vec!["田中"]);
        assert_eq!(chat.top_level("C-SATO").len(), 1);
        assert!(chat.top_level("C-TANAKA").is_empty());
        // meta is never filtered
        assert_eq!(chat.top_level("C-META").len(), 1);
    }

    #[tokio::test]
    async fn test_segment_failure_is_isolated() {
        let provider = ScriptedProvider::new(|request| {
            if request.prompt.contains("構成が良い") {
                Err(LlmError::new(ErrorCategory::Unavailable, "down").into())
            } else {
                Ok("1) よかった点\n- ok".to_string())
            }
        });
        let (distributor, chat) = distributor(provider, vec![]);
        let report = distributor.run(PAGE).await.unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "佐藤");
        assert!(report.has_failures());
        assert!(chat.top_level("C-SATO").is_empty());
        assert_eq!(chat.top_level("C-TANAKA").len(), 1);
    }

    #[tokio::test]
    async fn test_skips_unknown_and_empty() {
        let store = Arc::new(MemoryStore::new().with_page(
            PAGE,
            vec![
                Line::new("t", PAGE),
                Line::new("h1", "[** 🎤ゲスト] 飛び入り"),
                Line::new("b1", "面白い"),
                Line::new("h2", "[** 🎤佐藤]"),
                Line::new("h3", "[** 🎤田中]"),
                Line::new("b3", "良い"),
            ],
        ));
        let provider = Arc::new(ScriptedProvider::echo_kind());
        let chat = Arc::new(MemoryChat::new());
        let distributor = Distributor::new(
            store,
            Summarizer::new(provider.clone(), 0.2),
            chat.clone(),
            Router::new(&routing(), &AudienceConfig::default()),
        );

        let report = distributor.run(PAGE).await.unwrap();
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(skipped, vec!["ゲスト", "佐藤"]);
        assert_eq!(report.posted.len(), 1);
        assert_eq!(report.total(), 3);
        // only 田中 reached the model: overall + categories
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let (distributor, chat) = distributor(ScriptedProvider::echo_kind(), vec![]);
        let err = distributor.run("missing").await.unwrap_err();
        assert!(matches!(err, DigestError::FetchFailed { .. }));
        assert!(chat.calls().is_empty());
    }
}
