//! Summarizer
//!
//! Three fixed summary kinds over one segment of text. Each call is a single
//! completion; no retries, no caching. Every failure, including an empty
//! answer, comes back as `DigestError::SummarizationFailed`.

use tracing::debug;

use super::prompt::{Prompt, PromptTemplates};
use super::provider::{CompletionRequest, SharedProvider};
use crate::constants::summary;
use crate::types::{DigestError, ErrorCategory, LlmError, Result};

#[derive(Clone)]
pub struct Summarizer {
    provider: SharedProvider,
    temperature: f32,
}

impl Summarizer {
    pub fn new(provider: SharedProvider, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    /// Short overall summary, about three lines
    pub async fn summarize_overall(&self, text: &str) -> Result<String> {
        self.complete(
            "overall",
            PromptTemplates::overall(text),
            summary::OVERALL_MAX_TOKENS,
        )
        .await
    }

    /// Five `1)`..`5)` category blocks
    pub async fn summarize_categories(&self, text: &str) -> Result<String> {
        self.complete(
            "categories",
            PromptTemplates::categories(text),
            summary::CATEGORY_MAX_TOKENS,
        )
        .await
    }

    /// One `・` bullet per topic
    pub async fn summarize_meta(&self, text: &str) -> Result<String> {
        self.complete(
            "meta",
            PromptTemplates::meta(text),
            summary::CATEGORY_MAX_TOKENS,
        )
        .await
    }

    async fn complete(&self, kind: &str, prompt: Prompt, max_tokens: usize) -> Result<String> {
        let request = CompletionRequest {
            system: prompt.system,
            prompt: prompt.user,
            max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| match e {
                err @ DigestError::SummarizationFailed(_) => err,
                other => LlmError::with_provider(
                    ErrorCategory::Unknown,
                    other.to_string(),
                    self.provider.name(),
                )
                .into(),
            })?;

        debug!(
            "{} summary: {} tokens in {}ms",
            kind,
            response.usage.total(),
            response.timing.total_ms
        );

        let content = response.content.trim();
        if content.is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::ParseError,
                format!("empty {} summary", kind),
                self.provider.name(),
            )
            .into());
        }

        Ok(content.to_string())
    }
}
