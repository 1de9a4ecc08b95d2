//! AI Integration Layer
//!
//! Provider abstraction plus the seminar summarizer built on top of it.

pub mod prompt;
pub mod provider;
pub mod summarizer;

pub use prompt::{CATEGORY_TITLES, Prompt, PromptBuilder, PromptTemplates};
pub use provider::{
    CompletionRequest, LlmProvider, LlmResponse, OpenAiProvider, SharedProvider, TokenUsage,
    create_provider,
};
pub use summarizer::Summarizer;
