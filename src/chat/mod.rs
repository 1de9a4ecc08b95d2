//! Chat Platform Layer
//!
//! `ChatApi` is the four-call surface the digest needs from Slack. The
//! production client lives in [`slack`]; tests use [`MemoryChat`].

pub mod blocks;
#[cfg(test)]
mod memory;
mod slack;

pub use blocks::{Block, Element, Text, is_control};
#[cfg(test)]
pub use memory::MemoryChat;
pub use slack::SlackClient;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::Result;

/// One message as returned by `conversations.replies`
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub ts: String,
    pub blocks: Vec<Block>,
}

impl ChatMessage {
    pub fn is_control(&self) -> bool {
        is_control(&self.blocks)
    }
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Post a message, optionally as a threaded reply; returns its `ts`
    async fn post_message(
        &self,
        channel: &str,
        blocks: &[Block],
        thread_ts: Option<&str>,
    ) -> Result<String>;

    /// Replace the blocks of an existing message
    async fn update_message(&self, channel: &str, ts: &str, blocks: &[Block], text: &str)
    -> Result<()>;

    async fn delete_message(&self, channel: &str, ts: &str) -> Result<()>;

    /// Parent first, then replies in posting order
    async fn list_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ChatMessage>>;
}

pub type SharedChat = Arc<dyn ChatApi>;

/// A thread split into its permanent and transient parts
#[derive(Debug, Clone)]
pub struct ThreadState {
    pub parent: String,
    pub replies: Vec<ChatMessage>,
}

impl ThreadState {
    /// Build from a `list_replies` answer; the parent entry is dropped from `replies`
    pub fn from_messages(parent: &str, messages: Vec<ChatMessage>) -> Self {
        Self {
            parent: parent.to_string(),
            replies: messages.into_iter().filter(|m| m.ts != parent).collect(),
        }
    }

    pub fn control(&self) -> Option<&ChatMessage> {
        self.replies.iter().find(|m| m.is_control())
    }

    /// Replies that a regeneration may delete
    pub fn transient(&self) -> impl Iterator<Item = &ChatMessage> {
        self.replies.iter().filter(|m| !m.is_control())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(ts: &str, blocks: Vec<Block>) -> ChatMessage {
        ChatMessage {
            ts: ts.to_string(),
            blocks,
        }
    }

    #[test]
    fn test_thread_state_partitions() {
        let control = Block::Actions {
            elements: vec![],
            block_id: None,
        };
        let messages = vec![
            message("1.0", vec![Block::section("parent")]),
            message("1.1", vec![control]),
            message("1.2", vec![Block::section("*1) よかった点*")]),
            message("1.3", vec![]),
        ];

        let state = ThreadState::from_messages("1.0", messages);
        assert_eq!(state.replies.len(), 3);
        assert_eq!(state.control().map(|m| m.ts.as_str()), Some("1.1"));
        let transient: Vec<_> = state.transient().map(|m| m.ts.as_str()).collect();
        assert_eq!(transient, vec!["1.2", "1.3"]);
    }
}
