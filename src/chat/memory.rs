//! In-memory workspace for tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::{Block, ChatApi, ChatMessage};
use crate::types::{DigestError, Result};

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub channel: String,
    pub ts: String,
    pub thread_ts: Option<String>,
    pub blocks: Vec<Block>,
    pub text: Option<String>,
}

#[derive(Default)]
struct Workspace {
    messages: Vec<StoredMessage>,
    next: u64,
    calls: Vec<String>,
}

/// Fake Slack workspace: ordered messages, call log, injectable failures
#[derive(Default)]
pub struct MemoryChat {
    inner: Mutex<Workspace>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `method` (e.g. `chat.delete`) fail
    pub fn fail_on(&self, method: &str) {
        self.failing.lock().unwrap().insert(method.to_string());
    }

    /// Seed a message directly, bypassing the call log
    pub fn seed(&self, channel: &str, thread_ts: Option<&str>, blocks: Vec<Block>) -> String {
        let mut ws = self.inner.lock().unwrap();
        ws.next += 1;
        let ts = format!("1700000000.{:06}", ws.next);
        ws.messages.push(StoredMessage {
            channel: channel.to_string(),
            ts: ts.clone(),
            thread_ts: thread_ts.map(str::to_string),
            blocks,
            text: None,
        });
        ts
    }

    /// Top-level messages of a channel
    pub fn top_level(&self, channel: &str) -> Vec<StoredMessage> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.channel == channel && m.thread_ts.is_none())
            .cloned()
            .collect()
    }

    /// Replies under `thread_ts`, in posting order
    pub fn replies(&self, channel: &str, thread_ts: &str) -> Vec<StoredMessage> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.channel == channel && m.thread_ts.as_deref() == Some(thread_ts))
            .cloned()
            .collect()
    }

    pub fn get(&self, channel: &str, ts: &str) -> Option<StoredMessage> {
        self.inner
            .lock()
            .unwrap()
            .messages
            .iter()
            .find(|m| m.channel == channel && m.ts == ts)
            .cloned()
    }

    /// Method names in call order
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn enter(&self, method: &str) -> Result<std::sync::MutexGuard<'_, Workspace>> {
        if self.failing.lock().unwrap().contains(method) {
            return Err(DigestError::chat(method, "injected failure"));
        }
        let mut ws = self.inner.lock().unwrap();
        ws.calls.push(method.to_string());
        Ok(ws)
    }
}

#[async_trait]
impl ChatApi for MemoryChat {
    async fn post_message(
        &self,
        channel: &str,
        blocks: &[Block],
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let mut ws = self.enter("chat.postMessage")?;
        ws.next += 1;
        let ts = format!("1700000000.{:06}", ws.next);
        ws.messages.push(StoredMessage {
            channel: channel.to_string(),
            ts: ts.clone(),
            thread_ts: thread_ts.map(str::to_string),
            blocks: blocks.to_vec(),
            text: None,
        });
        Ok(ts)
    }

    async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        blocks: &[Block],
        text: &str,
    ) -> Result<()> {
        let mut ws = self.enter("chat.update")?;
        let message = ws
            .messages
            .iter_mut()
            .find(|m| m.channel == channel && m.ts == ts)
            .ok_or_else(|| DigestError::chat("chat.update", "message_not_found"))?;
        message.blocks = blocks.to_vec();
        message.text = Some(text.to_string());
        Ok(())
    }

    async fn delete_message(&self, channel: &str, ts: &str) -> Result<()> {
        let mut ws = self.enter("chat.delete")?;
        let before = ws.messages.len();
        ws.messages.retain(|m| !(m.channel == channel && m.ts == ts));
        if ws.messages.len() == before {
            return Err(DigestError::chat("chat.delete", "message_not_found"));
        }
        Ok(())
    }

    async fn list_replies(&self, channel: &str, thread_ts: &str) -> Result<Vec<ChatMessage>> {
        let ws = self.enter("conversations.replies")?;
        Ok(ws
            .messages
            .iter()
            .filter(|m| {
                m.channel == channel
                    && (m.ts == thread_ts || m.thread_ts.as_deref() == Some(thread_ts))
            })
            .map(|m| ChatMessage {
                ts: m.ts.clone(),
                blocks: m.blocks.clone(),
            })
            .collect())
    }
}
