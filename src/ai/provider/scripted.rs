//! Scripted provider for tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{CompletionRequest, LlmProvider, LlmResponse};
use crate::types::Result;

type Script = Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

/// Answers every request through a closure and records what it was asked
pub struct ScriptedProvider {
    script: Script,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Canned answers per summary kind, recognized from the prompt text
    pub fn echo_kind() -> Self {
        Self::new(|request| {
            let answer = if request.prompt.contains("5つのカテゴリ") {
                "1) よかった点\n- 構成が明快\n2) 気づき / 新しい視点\n- 比較が新鮮\n\
                 3) 改善点\n- 図が小さい\n4) 次回までに修正\n- 図を直す\n5) 質問・不明点\n- 母数は?"
            } else if request.prompt.contains("中黒") {
                "・連絡事項\n・次回の担当"
            } else {
                "全体要約"
            };
            Ok(answer.to_string())
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        (self.script)(request).map(LlmResponse::content_only)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
