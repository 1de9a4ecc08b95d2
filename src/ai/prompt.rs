//! Prompt Builder
//!
//! Builds the fixed Japanese prompts used for seminar digests. The category
//! prompt pins every block to a `1)`..`5)` marker so the answer can be split
//! mechanically.

/// Category titles in display order
pub const CATEGORY_TITLES: [&str; 5] = [
    "よかった点",
    "気づき / 新しい視点",
    "改善点",
    "次回までに修正",
    "質問・不明点",
];

const SYSTEM_ROLE: &str = "あなたは大学ゼミの議事録要約AIです。";

/// Prompt section types
#[derive(Debug, Clone)]
enum PromptSection {
    /// Free instruction text
    Instruction(String),
    /// Numbered list, `1) item`
    Numbered(Vec<String>),
    /// Source material after the `###` delimiter
    Source(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    system: Option<String>,
    sections: Vec<PromptSection>,
}

/// Rendered prompt: system role plus user message
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, role: &str) -> Self {
        self.system = Some(role.to_string());
        self
    }

    pub fn instruction(mut self, text: &str) -> Self {
        self.sections
            .push(PromptSection::Instruction(text.to_string()));
        self
    }

    pub fn numbered<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(PromptSection::Numbered(
            items.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn source(mut self, text: &str) -> Self {
        self.sections.push(PromptSection::Source(text.to_string()));
        self
    }

    pub fn build(self) -> Prompt {
        let mut user = String::new();

        for section in self.sections {
            match section {
                PromptSection::Instruction(text) => {
                    user.push_str(&text);
                    user.push('\n');
                }
                PromptSection::Numbered(items) => {
                    for (i, item) in items.iter().enumerate() {
                        user.push_str(&format!("{}) {}\n", i + 1, item));
                    }
                }
                PromptSection::Source(text) => {
                    user.push_str("\n###\n");
                    user.push_str(&text);
                    user.push('\n');
                }
            }
        }

        Prompt {
            system: self.system,
            user: user.trim_end().to_string(),
        }
    }
}

/// Preset prompts for the three summary kinds
pub struct PromptTemplates;

impl PromptTemplates {
    /// About three lines that still make sense when reread later
    pub fn overall(text: &str) -> Prompt {
        PromptBuilder::new()
            .system(SYSTEM_ROLE)
            .instruction(
                "以下を3行程度で、後で見返したときに分かりやすい全体要約を作成してください。",
            )
            .source(text)
            .build()
    }

    /// Five marked category blocks with 2 to 4 bullets each
    pub fn categories(text: &str) -> Prompt {
        PromptBuilder::new()
            .system(SYSTEM_ROLE)
            .instruction("以下のフィードバックを5つのカテゴリにまとめてください。")
            .instruction(
                "各カテゴリの行頭を必ず「1)」「2)」「3)」「4)」「5)」の数字と括弧で始め、\
                 そのあとにカテゴリ名を書き、2〜4行の箇条書き（•）を付けてください。",
            )
            .numbered(CATEGORY_TITLES)
            .source(text)
            .build()
    }

    /// One line per topic, original order, bullets only
    pub fn meta(text: &str) -> Prompt {
        PromptBuilder::new()
            .system(SYSTEM_ROLE)
            .instruction(
                "次のテキストを「話題ごと」にまとめ、各話題を・（中黒）から始めて1行以内の日本語にしてください。\
                 順序は原文のまま、箇条書きのみを返してください。",
            )
            .source(text)
            .build()
    }
}
