//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Kinds
//!
//! - **Fatal for a run**: `FetchFailed`, `Config`
//! - **Skip one segment, warn**: `UnknownPresenter`, `NoDestination`,
//!   `EmptySegment`, `EmptyCategoryBlock`
//! - **Fatal for one segment / one regeneration cycle**: `SummarizationFailed`,
//!   `Chat`, `StaleAnchor`
//! - **Rejected at the boundary**: `SignatureInvalid`, `InvalidRetryToken`
//!
//! LLM transport failures carry an [`ErrorCategory`] so logs say whether the
//! provider was rate limited, unauthorized, or down.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Categories for LLM transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable (5xx, 404)
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Response body could not be decoded
    ParseError,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 | 500 | 502 | 503 | 504 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Classify a reqwest transport error (no HTTP status available)
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        let category = if err.is_timeout() || err.is_connect() {
            ErrorCategory::Network
        } else if err.is_decode() {
            ErrorCategory::ParseError
        } else if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        } else {
            ErrorCategory::Unknown
        };
        LlmError::with_provider(category, err.to_string(), provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DigestError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Document Store
    // -------------------------------------------------------------------------
    /// Page could not be fetched or the response had no `lines`
    #[error("Failed to fetch page '{page}': {reason}")]
    FetchFailed { page: String, reason: String },

    /// Remembered anchor no longer exists in the page
    #[error("Anchor {anchor} not found in page '{page}'")]
    StaleAnchor { page: String, anchor: String },

    // -------------------------------------------------------------------------
    // Segment Routing (skip + warn)
    // -------------------------------------------------------------------------
    #[error("Presenter '{0}' has no alias entry")]
    UnknownPresenter(String),

    #[error("No destination channel configured for {0}")]
    NoDestination(String),

    #[error("Segment '{0}' has an empty body")]
    EmptySegment(String),

    #[error("Category block '{0}' has no content")]
    EmptyCategoryBlock(String),

    // -------------------------------------------------------------------------
    // External Services
    // -------------------------------------------------------------------------
    #[error("Summarization failed: {0}")]
    SummarizationFailed(LlmError),

    #[error("Slack API error in {method}: {reason}")]
    Chat { method: String, reason: String },

    // -------------------------------------------------------------------------
    // Webhook Boundary
    // -------------------------------------------------------------------------
    #[error("Request signature does not match")]
    SignatureInvalid,

    #[error("Invalid retry token: {0}")]
    InvalidRetryToken(String),
}

impl From<LlmError> for DigestError {
    fn from(err: LlmError) -> Self {
        DigestError::SummarizationFailed(err)
    }
}

pub type Result<T> = std::result::Result<T, DigestError>;

impl DigestError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn fetch_failed(page: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            page: page.into(),
            reason: reason.into(),
        }
    }

    pub fn chat(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Chat {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Errors that skip one segment with a warning but never abort a run
    pub fn is_segment_skip(&self) -> bool {
        matches!(
            self,
            Self::UnknownPresenter(_)
                | Self::NoDestination(_)
                | Self::EmptySegment(_)
                | Self::EmptyCategoryBlock(_)
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::Unavailable.to_string(), "UNAVAILABLE");
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "openai");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "openai");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(503, "Overloaded", "openai");
        assert_eq!(server_error.category, ErrorCategory::Unavailable);

        let odd = ErrorClassifier::classify_http_status(418, "teapot", "openai");
        assert_eq!(odd.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_llm_error_becomes_summarization_failed() {
        let err: DigestError = LlmError::new(ErrorCategory::Unknown, "boom").into();
        assert!(matches!(err, DigestError::SummarizationFailed(_)));
        assert!(!err.is_segment_skip());
    }

    #[test]
    fn test_segment_skip_kinds() {
        assert!(DigestError::UnknownPresenter("x".into()).is_segment_skip());
        assert!(DigestError::NoDestination("SATO".into()).is_segment_skip());
        assert!(DigestError::EmptySegment("x".into()).is_segment_skip());
        assert!(DigestError::EmptyCategoryBlock("1)".into()).is_segment_skip());
        assert!(!DigestError::fetch_failed("p", "503").is_segment_skip());
        assert!(!DigestError::SignatureInvalid.is_segment_skip());
    }
}
