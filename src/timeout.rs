//! Timeout helpers
//!
//! Wraps async operations so an elapsed deadline surfaces as
//! [`DigestError::Timeout`] instead of a bare `Elapsed`.
//!
//! ```ignore
//! use crate::timeout::with_timeout;
//!
//! let result = with_timeout(
//!     Duration::from_millis(2_500),
//!     regenerator.acknowledge(&token),
//!     "acknowledge",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DigestError, Result};

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DigestError::timeout(operation_name, timeout)),
    }
}
