pub mod error;

pub use error::{DigestError, ErrorCategory, ErrorClassifier, LlmError, Result};
