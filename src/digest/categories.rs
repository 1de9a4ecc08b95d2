//! Category block tokenizer
//!
//! Splits the model's category answer into blocks. A line opens a new block
//! when it starts with a marker:
//!
//! ```text
//! marker := pictographic-emoji | [1-5] ")" | "###"
//! ```
//!
//! Indented lines never open a block, so nested numbering stays in the body.
//! Text before the first marker forms its own block, which normally has no
//! body and is skipped downstream.

use regex::Regex;
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\p{Extended_Pictographic}|[1-5]\)|###)").expect("valid marker regex")
});

const BULLET: &str = "• ";

/// One category reply: bold title plus bullet body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBlock {
    pub title: String,
    /// Normalized bullets joined by `\n`; empty when the model gave no items
    pub body: String,
}

impl CategoryBlock {
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Split into trimmed, non-empty raw blocks
pub fn split_blocks(text: &str) -> Vec<&str> {
    let mut starts = vec![0];
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if offset > 0 && MARKER.is_match(line) {
            starts.push(offset);
        }
        offset += line.len();
    }
    starts.push(text.len());

    starts
        .windows(2)
        .map(|w| text[w[0]..w[1]].trim())
        .filter(|block| !block.is_empty())
        .collect()
}

/// First non-blank line is the title (`### ` dropped, `1)` kept); the rest is body
pub fn parse_block(block: &str) -> CategoryBlock {
    let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());

    let title = lines
        .next()
        .map(|t| t.trim_start_matches("###").trim().to_string())
        .unwrap_or_default();
    let body = lines.map(normalize_bullet).collect::<Vec<_>>().join("\n");

    CategoryBlock { title, body }
}

pub fn split_categories(text: &str) -> Vec<CategoryBlock> {
    split_blocks(text).into_iter().map(parse_block).collect()
}

/// `-`, `•` and `・` prefixes become `• `
pub fn normalize_bullet(line: &str) -> String {
    let line = line.trim();
    match line.strip_prefix(['-', '•', '・']) {
        Some(rest) => format!("{}{}", BULLET, rest.trim_start()),
        None => line.to_string(),
    }
}

/// Meta answers use `・`; only that prefix is rewritten
pub fn normalize_meta(text: &str) -> String {
    text.lines()
        .map(|line| match line.strip_prefix('・') {
            Some(rest) => format!("{}{}", BULLET, rest),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ANSWER: &str = "1) よかった点\n- 構成が明快\n・図が見やすい\n\n2) 気づき / 新しい視点\n• 比較が新鮮\n3) 改善点\n4) 次回までに修正\n  - 図を直す";

    #[test]
    fn test_numbered_markers() {
        let blocks = split_categories(ANSWER);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].title, "1) よかった点");
        assert_eq!(blocks[0].body, "• 構成が明快\n• 図が見やすい");
        assert_eq!(blocks[1].body, "• 比較が新鮮");
        assert!(blocks[2].is_empty());
        assert_eq!(blocks[3].title, "4) 次回までに修正");
        assert_eq!(blocks[3].body, "• 図を直す");
    }

    #[test]
    fn test_hash_and_emoji_markers() {
        let text = "### よかった点\n- a\n🔍 気づき\n- b\n⚠ 改善点\n- c";
        let blocks = split_categories(text);
        let titles: Vec<_> = blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["よかった点", "🔍 気づき", "⚠ 改善点"]);
    }

    #[test]
    fn test_preamble_is_its_own_block() {
        let blocks = split_categories("以下の通りです。\n1) よかった点\n- a");
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_empty());
        assert_eq!(blocks[1].body, "• a");
    }

    #[test]
    fn test_marker_mid_line_does_not_split() {
        let blocks = split_categories("1) よかった点\n- 手順 1) と 2) が明快");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_indented_numbering_stays_in_body() {
        let blocks = split_categories("1) よかった点\n  1) 構成が明快\n  2) 図が良い\n2) 改善点\n- x");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "1) よかった点");
        assert_eq!(blocks[0].body, "1) 構成が明快\n2) 図が良い");
        assert_eq!(blocks[1].title, "2) 改善点");
        assert_eq!(blocks[1].body, "• x");
    }

    #[test]
    fn test_normalize_bullet() {
        assert_eq!(normalize_bullet("-   item"), "• item");
        assert_eq!(normalize_bullet("•item"), "• item");
        assert_eq!(normalize_bullet("plain"), "plain");
    }

    #[test]
    fn test_normalize_meta() {
        assert_eq!(normalize_meta("・連絡\n・次回\n補足"), "• 連絡\n• 次回\n補足");
    }

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            "[1-5]\\) [a-z]{1,6}",
            "- [a-z]{1,6}",
            "### [a-z]{1,6}",
            "[👏🔍⚠📝] [a-z]{1,6}",
            "[a-z ]{0,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_split_rejoin_is_stable(lines in prop::collection::vec(line(), 0..20)) {
            let text = lines.join("\n");
            let blocks = split_blocks(&text);
            let rejoined = blocks.join("\n");
            prop_assert_eq!(split_blocks(&rejoined), blocks);
        }
    }
}
