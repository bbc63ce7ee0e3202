//! Wire-level ledger abstraction.
//!
//! Mirrors the four ledger operations: write an index record, poll its
//! finalization, read the record count, read one record. Enables mock
//! implementations for testing.

use crate::model::{Address, ContentRef, IndexRecord};
use async_trait::async_trait;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("No identity is bound to sign the ledger write")]
    IdentityUnavailable,

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Ledger write not finalized: {0}")]
    Rejected(String),

    #[error("Index record {index} not found")]
    NotFound { index: u64 },
}

impl LedgerError {
    /// Transport-level failures may be retried with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Unavailable(_))
    }
}

/// Handle for a write that has been submitted but not yet finalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingWrite {
    pub id: String,
}

/// Finalization state of a submitted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalization {
    Pending,
    Finalized { sequence_index: u64 },
    Rejected(String),
}

/// Trait abstraction for the ledger wire contract.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit a new index record signed by `author`.
    async fn write_index_record(
        &self,
        content_ref: &ContentRef,
        title: &str,
        author: &Address,
    ) -> LedgerResult<PendingWrite>;

    /// Current finalization state of a submitted write.
    async fn finalization(&self, pending: &PendingWrite) -> LedgerResult<Finalization>;

    /// Number of finalized records.
    async fn read_count(&self) -> LedgerResult<u64>;

    /// Record at `index`, with `sequence_index == index`.
    async fn read_index_record(&self, index: u64) -> LedgerResult<IndexRecord>;
}
