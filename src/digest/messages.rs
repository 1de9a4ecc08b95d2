//! Message layouts and the category reply loop shared by distribution and
//! regeneration

use tracing::{debug, warn};

use super::categories::{CategoryBlock, split_categories};
use crate::chat::{Block, ChatApi, Element, Text};
use crate::constants::slack::{CONTROL_BLOCK_ID, RETRY_ACTION_ID};
use crate::types::{DigestError, Result};

pub const REGENERATING_TEXT: &str = "🔄 再生成中…";
pub const REGENERATED_TEXT: &str = "✅ 再生成完了";
pub const STALE_ANCHOR_TEXT: &str = "⚠ 元ページの該当セクションが見つかりませんでした";
pub const REGENERATION_FAILED_TEXT: &str = "⚠ 要約の再生成に失敗しました";

const RETRY_BUTTON_LABEL: &str = "🔄 要約を再生成";

/// Header, overall summary, link back to the presenter's section
pub fn parent_blocks(author: &str, summary: &str, url: &str) -> Vec<Block> {
    vec![
        Block::section(format!("*{} さんへの全体要約* :memo:", author)),
        Block::section(summary),
        Block::link(url, &format!("元ページ（{} セクションへ）", author)),
    ]
}

/// Single `actions` block carrying the regenerate button
pub fn control_blocks(token_value: &str) -> Vec<Block> {
    vec![Block::Actions {
        block_id: Some(CONTROL_BLOCK_ID.to_string()),
        elements: vec![Element::Button {
            text: Text::plain(RETRY_BUTTON_LABEL),
            action_id: RETRY_ACTION_ID.to_string(),
            value: token_value.to_string(),
            style: Some("primary".to_string()),
        }],
    }]
}

pub fn category_blocks(category: &CategoryBlock) -> Vec<Block> {
    vec![
        Block::section(format!("*{}*", category.title)),
        Block::section(category.body.as_str()),
    ]
}

pub fn meta_blocks(bullets: &str, url: &str) -> Vec<Block> {
    vec![
        Block::section("*:information_source:  今週の「メタなこと」まとめ*"),
        Block::section(bullets),
        Block::link(url, "Scrapbox の元ページ（メタなことへ）"),
    ]
}

pub fn regenerating_blocks() -> Vec<Block> {
    vec![Block::section(REGENERATING_TEXT)]
}

pub fn stale_anchor_blocks(author: &str, url: &str) -> Vec<Block> {
    vec![
        Block::section(format!(
            "{}（{} さんのセクション）。ページが編集された可能性があります。",
            STALE_ANCHOR_TEXT, author
        )),
        Block::link(url, "元ページを開く"),
    ]
}

pub fn regeneration_failed_blocks(author: &str, url: &str) -> Vec<Block> {
    vec![
        Block::section(format!(
            "{}（{} さんのセクション）。もう一度ボタンを押してください。",
            REGENERATION_FAILED_TEXT, author
        )),
        Block::link(url, "元ページを開く"),
    ]
}

/// Split the category answer and post one reply per non-empty block.
///
/// Empty blocks are skipped with a warning. Returns the number of replies
/// posted; the first failed post aborts the loop.
pub async fn post_categories(
    chat: &dyn ChatApi,
    channel: &str,
    thread_ts: &str,
    answer: &str,
) -> Result<usize> {
    let mut posted = 0;
    for category in split_categories(answer) {
        if category.is_empty() {
            warn!("{}", DigestError::EmptyCategoryBlock(category.title.clone()));
            continue;
        }
        chat.post_message(channel, &category_blocks(&category), Some(thread_ts))
            .await?;
        debug!("Posted category '{}'", category.title);
        posted += 1;
    }
    Ok(posted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{MemoryChat, is_control};

    #[test]
    fn test_parent_layout() {
        let blocks = parent_blocks("佐藤", "要約", "https://scrapbox.io/p/Week#a1");
        assert_eq!(blocks[0].text(), Some("*佐藤 さんへの全体要約* :memo:"));
        assert_eq!(blocks[1].text(), Some("要約"));
        let link = serde_json::to_value(&blocks[2]).unwrap();
        assert_eq!(
            link["elements"][0]["text"],
            "<https://scrapbox.io/p/Week#a1|元ページ（佐藤 セクションへ）>"
        );
    }

    #[test]
    fn test_control_layout() {
        let blocks = control_blocks(r#"{"page":"p"}"#);
        assert!(is_control(&blocks));
        let value = serde_json::to_value(&blocks[0]).unwrap();
        assert_eq!(value["block_id"], "retry-control");
        assert_eq!(value["elements"][0]["type"], "button");
        assert_eq!(value["elements"][0]["action_id"], "retry-summary");
        assert_eq!(value["elements"][0]["value"], r#"{"page":"p"}"#);
    }

    #[tokio::test]
    async fn test_post_categories_skips_empty_blocks() {
        let chat = MemoryChat::new();
        let parent = chat.seed("C1", None, vec![Block::section("parent")]);
        let answer = "1) よかった点\n- a\n2) 気づき / 新しい視点\n3) 改善点\n・b";

        let posted = post_categories(&chat, "C1", &parent, answer).await.unwrap();
        assert_eq!(posted, 2);

        let replies = chat.replies("C1", &parent);
        assert_eq!(replies[0].blocks[0].text(), Some("*1) よかった点*"));
        assert_eq!(replies[0].blocks[1].text(), Some("• a"));
        assert_eq!(replies[1].blocks[1].text(), Some("• b"));
    }

    #[tokio::test]
    async fn test_post_categories_stops_on_failure() {
        let chat = MemoryChat::new();
        chat.fail_on("chat.postMessage");
        let err = post_categories(&chat, "C1", "1.0", "1) a\n- b").await.unwrap_err();
        assert!(matches!(err, DigestError::Chat { .. }));
    }
}
