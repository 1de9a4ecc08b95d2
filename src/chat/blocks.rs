//! Block Kit subset
//!
//! Only the block types this crate posts are modeled. Anything else that
//! comes back from `conversations.replies` decodes as `Other`, so a thread
//! with foreign content still lists cleanly.

use serde::{Deserialize, Serialize};

use crate::constants::slack::CONTROL_BLOCK_ID;

/// Text object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn {
        text: String,
    },
    PlainText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
}

impl Text {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: Some(true),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mrkdwn { text } | Self::PlainText { text, .. } => text,
        }
    }
}

/// Interactive element inside an `actions` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        text: Text,
        action_id: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
    },
    Context {
        elements: Vec<Text>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
    },
    Actions {
        elements: Vec<Element>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
    },
    #[serde(other)]
    Other,
}

impl Block {
    pub fn section(mrkdwn: impl Into<String>) -> Self {
        Self::Section {
            text: Some(Text::mrkdwn(mrkdwn)),
            block_id: None,
        }
    }

    /// Context line holding a single `<url|label>` link
    pub fn link(url: &str, label: &str) -> Self {
        Self::Context {
            elements: vec![Text::mrkdwn(format!("<{}|{}>", url, label))],
            block_id: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Section {
                text: Some(text), ..
            } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// The thread's permanent control message: first block is `actions`, or an
/// `actions` block carries the control tag
pub fn is_control(blocks: &[Block]) -> bool {
    let structural = matches!(blocks.first(), Some(Block::Actions { .. }));
    let tagged = blocks.iter().any(|b| {
        matches!(b, Block::Actions { block_id: Some(id), .. } if id == CONTROL_BLOCK_ID)
    });
    structural || tagged
}
