//! Content store abstraction.
//!
//! Backends store opaque payloads under a key derived from the payload bytes.
//! `put` is all-or-nothing: a caller either observes a fully stored payload or
//! an error.

use crate::model::{ContentPayload, ContentRef};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for content store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during content store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Content store unavailable: {0}")]
    Unavailable(String),

    #[error("Content not found: {reference}")]
    NotFound { reference: String },
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Content-addressed storage backend.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a payload. Byte-identical payloads yield the same reference.
    async fn put(&self, payload: &ContentPayload) -> StoreResult<ContentRef>;

    /// Fetch a payload by reference. No retries.
    async fn get(&self, reference: &ContentRef) -> StoreResult<ContentPayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_retryable() {
        assert!(StoreError::Unavailable("timeout".to_string()).is_retryable());
        assert!(!StoreError::NotFound {
            reference: "abc".to_string()
        }
        .is_retryable());
    }
}
