//! Regeneration Workflow
//!
//! Triggered by the regenerate button. `acknowledge` marks the parent as in
//! progress and must be quick; `run` does the real work:
//!
//! 1. locate the segment again by anchor (stale anchor: notice on the parent)
//! 2. summarize overall + categories
//! 3. replace the parent
//! 4. delete every reply except the control
//! 5. post fresh category replies
//!
//! The first failing step ends the cycle; earlier steps are not rolled back.
//! When steps 2 or 3 fail the parent is switched to a failure notice so it
//! does not stay in the in-progress state.

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::messages::{
    REGENERATED_TEXT, REGENERATING_TEXT, REGENERATION_FAILED_TEXT, STALE_ANCHOR_TEXT,
    parent_blocks, post_categories, regenerating_blocks, regeneration_failed_blocks,
    stale_anchor_blocks,
};
use super::retry_token::RetryToken;
use crate::ai::Summarizer;
use crate::chat::{SharedChat, ThreadState};
use crate::outline::locate;
use crate::source::SharedStore;
use crate::types::{DigestError, Result};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegenerationReport {
    /// Transient replies removed from the thread
    pub deleted: usize,
    /// Category replies posted afterwards
    pub reposted: usize,
}

#[derive(Clone)]
pub struct Regenerator {
    store: SharedStore,
    summarizer: Summarizer,
    chat: SharedChat,
}

impl Regenerator {
    pub fn new(store: SharedStore, summarizer: Summarizer, chat: SharedChat) -> Self {
        Self {
            store,
            summarizer,
            chat,
        }
    }

    /// Show the in-progress state on the parent
    pub async fn acknowledge(&self, token: &RetryToken) -> Result<()> {
        self.chat
            .update_message(
                &token.channel,
                &token.thread_ts,
                &regenerating_blocks(),
                REGENERATING_TEXT,
            )
            .await
    }

    #[instrument(skip(self, token), fields(author = %token.author, anchor = %token.anchor))]
    pub async fn run(&self, token: &RetryToken) -> Result<RegenerationReport> {
        let url = self.store.anchor_url(&token.page, &token.anchor);

        let text = match locate(self.store.as_ref(), &token.page, &token.anchor).await {
            Ok(text) => text,
            Err(e @ DigestError::StaleAnchor { .. }) => {
                warn!("{}", e);
                self.chat
                    .update_message(
                        &token.channel,
                        &token.thread_ts,
                        &stale_anchor_blocks(&token.author, &url),
                        STALE_ANCHOR_TEXT,
                    )
                    .await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let answer = match self.replace_parent(token, &text, &url).await {
            Ok(answer) => answer,
            Err(e) => {
                self.notify_failure(token, &url).await;
                return Err(e);
            }
        };

        let deleted = self.clean_thread(&token.channel, &token.thread_ts).await?;
        let reposted =
            post_categories(self.chat.as_ref(), &token.channel, &token.thread_ts, &answer).await?;

        info!(
            "Regenerated {}: {} replies replaced by {}",
            token.author, deleted, reposted
        );
        Ok(RegenerationReport { deleted, reposted })
    }

    /// Summarize and write the new parent; returns the category answer
    async fn replace_parent(&self, token: &RetryToken, text: &str, url: &str) -> Result<String> {
        let overall = self.summarizer.summarize_overall(text).await?;
        let answer = self.summarizer.summarize_categories(text).await?;

        self.chat
            .update_message(
                &token.channel,
                &token.thread_ts,
                &parent_blocks(&token.author, &overall, url),
                REGENERATED_TEXT,
            )
            .await?;
        Ok(answer)
    }

    /// Best effort; the original error is what the caller reports
    async fn notify_failure(&self, token: &RetryToken, url: &str) {
        let notice = self
            .chat
            .update_message(
                &token.channel,
                &token.thread_ts,
                &regeneration_failed_blocks(&token.author, url),
                REGENERATION_FAILED_TEXT,
            )
            .await;
        if let Err(e) = notice {
            warn!("Could not post failure notice on {}: {}", token.thread_ts, e);
        }
    }

    /// Delete every reply except the parent and the control message
    pub async fn clean_thread(&self, channel: &str, thread_ts: &str) -> Result<usize> {
        let messages = self.chat.list_replies(channel, thread_ts).await?;
        let thread = ThreadState::from_messages(thread_ts, messages);
        if thread.control().is_none() {
            warn!("Thread {} has no control message", thread_ts);
        }

        let mut deleted = 0;
        for message in thread.transient() {
            self.chat.delete_message(channel, &message.ts).await?;
            deleted += 1;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ScriptedProvider;
    use crate::chat::{Block, MemoryChat};
    use crate::digest::messages::control_blocks;
    use crate::outline::Line;
    use crate::source::MemoryStore;
    use std::sync::Arc;

    const PAGE: &str = "Week_3";

    fn lines(body: &str) -> Vec<Line> {
        vec![
            Line::new("t", PAGE),
            Line::new("h1", "[** 🎤佐藤] 発表"),
            Line::new("b1", body),
            Line::new("h2", "[** 🎤田中] 発表"),
            Line::new("b2", "別の話"),
        ]
    }

    struct Fixture {
        regenerator: Regenerator,
        store: Arc<MemoryStore>,
        chat: Arc<MemoryChat>,
        provider: Arc<ScriptedProvider>,
        token: RetryToken,
        control: String,
    }

    /// Parent + control R1 + two stale category replies R2, R3
    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new().with_page(PAGE, lines("新しい本文")));
        let chat = Arc::new(MemoryChat::new());
        let provider = Arc::new(ScriptedProvider::echo_kind());

        let parent = chat.seed("C1", None, vec![Block::section("old parent")]);
        let token = RetryToken {
            page: PAGE.into(),
            anchor: "h1".into(),
            author: "佐藤".into(),
            channel: "C1".into(),
            thread_ts: parent.clone(),
        };
        let control = chat.seed(
            "C1",
            Some(&parent),
            control_blocks(&token.encode().unwrap()),
        );
        chat.seed("C1", Some(&parent), vec![Block::section("*old R2*")]);
        chat.seed("C1", Some(&parent), vec![Block::section("*old R3*")]);

        let regenerator = Regenerator::new(
            store.clone(),
            Summarizer::new(provider.clone(), 0.2),
            chat.clone(),
        );
        Fixture {
            regenerator,
            store,
            chat,
            provider,
            token,
            control,
        }
    }

    #[tokio::test]
    async fn test_acknowledge_marks_parent() {
        let f = fixture();
        f.regenerator.acknowledge(&f.token).await.unwrap();
        let parent = f.chat.get("C1", &f.token.thread_ts).unwrap();
        assert_eq!(parent.blocks, regenerating_blocks());
        assert_eq!(parent.text.as_deref(), Some(REGENERATING_TEXT));
    }

    #[tokio::test]
    async fn test_run_replaces_thread() {
        let f = fixture();
        let report = f.regenerator.run(&f.token).await.unwrap();
        assert_eq!(report.deleted, 2);
        assert_eq!(report.reposted, 5);

        let parent = f.chat.get("C1", &f.token.thread_ts).unwrap();
        assert_eq!(parent.blocks[0].text(), Some("*佐藤 さんへの全体要約* :memo:"));
        assert_eq!(parent.blocks[1].text(), Some("全体要約"));

        let replies = f.chat.replies("C1", &f.token.thread_ts);
        assert_eq!(replies.len(), 6);
        assert_eq!(replies[0].ts, f.control);
        assert!(replies[1..].iter().all(|r| r.ts > f.control));
        assert!(!replies.iter().any(|r| r.blocks[0].text() == Some("*old R2*")));

        // the model saw the freshly located text, not the old summary
        assert!(f.provider.requests()[0].prompt.contains("新しい本文"));
    }

    #[tokio::test]
    async fn test_run_is_repeatable() {
        let f = fixture();
        f.regenerator.run(&f.token).await.unwrap();
        let second = f.regenerator.run(&f.token).await.unwrap();
        assert_eq!(second.deleted, 5);
        assert_eq!(f.chat.replies("C1", &f.token.thread_ts).len(), 6);
    }

    #[tokio::test]
    async fn test_stale_anchor_posts_notice() {
        let f = fixture();
        f.store.set_page(PAGE, vec![Line::new("t", PAGE), Line::new("x", "rewritten")]);

        let err = f.regenerator.run(&f.token).await.unwrap_err();
        assert!(matches!(err, DigestError::StaleAnchor { .. }));

        let parent = f.chat.get("C1", &f.token.thread_ts).unwrap();
        assert!(parent.blocks[0].text().unwrap().starts_with(STALE_ANCHOR_TEXT));
        assert_eq!(f.chat.replies("C1", &f.token.thread_ts).len(), 3);
        assert!(f.provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failure_halts_before_cleanup() {
        let f = fixture();
        f.chat.fail_on("chat.update");
        assert!(f.regenerator.run(&f.token).await.is_err());
        assert!(!f.chat.calls().contains(&"chat.delete".to_string()));
        assert_eq!(f.chat.replies("C1", &f.token.thread_ts).len(), 3);
    }

    #[tokio::test]
    async fn test_summary_failure_leaves_notice_on_parent() {
        let f = fixture();
        f.regenerator.acknowledge(&f.token).await.unwrap();
        let regenerator = Regenerator::new(
            f.store.clone(),
            Summarizer::new(Arc::new(ScriptedProvider::new(|_| Ok(String::new()))), 0.2),
            f.chat.clone(),
        );

        let err = regenerator.run(&f.token).await.unwrap_err();
        assert!(matches!(err, DigestError::SummarizationFailed(_)));

        let parent = f.chat.get("C1", &f.token.thread_ts).unwrap();
        assert_eq!(parent.text.as_deref(), Some(REGENERATION_FAILED_TEXT));
        assert!(parent.blocks[0].text().unwrap().starts_with(REGENERATION_FAILED_TEXT));
        assert_eq!(f.chat.replies("C1", &f.token.thread_ts).len(), 3);
    }

    #[tokio::test]
    async fn test_clean_thread_keeps_parent_and_control() {
        let f = fixture();
        let deleted = f
            .regenerator
            .clean_thread("C1", &f.token.thread_ts)
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert!(f.chat.get("C1", &f.token.thread_ts).is_some());
        let replies = f.chat.replies("C1", &f.token.thread_ts);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].ts, f.control);
    }
}
