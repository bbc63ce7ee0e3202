//! In-memory ledger for testing.
//!
//! Writes become visible only once finalized, as on the real ledger. Supports
//! failure injection and per-index read latency for ordering tests.

use super::traits::*;
use crate::model::{now_millis, Address, ContentRef, IndexRecord, Millis};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock ledger transport.
#[derive(Clone)]
pub struct MockLedger {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    records: Vec<IndexRecord>,
    pending: HashMap<String, PendingEntry>,
    submitted: Vec<(ContentRef, String)>,
    next_pending: u64,
    fixed_timestamp: Option<Millis>,
    polls_before_finalize: u32,
    never_finalize: bool,
    reject_reason: Option<String>,
    unavailable: bool,
    fail_read_at: Option<u64>,
    read_delays_ms: Vec<u64>,
}

struct PendingEntry {
    content_ref: ContentRef,
    title: String,
    author: Address,
    polls: u32,
    outcome: Option<Finalization>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Stamp every finalized record with this timestamp.
    pub fn set_timestamp(&self, timestamp: Option<Millis>) {
        self.state.lock().unwrap().fixed_timestamp = timestamp;
    }

    /// Report `Pending` for this many polls before finalizing.
    pub fn finalize_after_polls(&self, polls: u32) {
        self.state.lock().unwrap().polls_before_finalize = polls;
    }

    /// Keep every write pending forever.
    pub fn never_finalize(&self, never: bool) {
        self.state.lock().unwrap().never_finalize = never;
    }

    /// Reject every subsequent write at finalization with `reason`.
    pub fn reject_writes(&self, reason: Option<String>) {
        self.state.lock().unwrap().reject_reason = reason;
    }

    /// Make every call fail as unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Fail reads of one index as unreachable.
    pub fn fail_read_at(&self, index: Option<u64>) {
        self.state.lock().unwrap().fail_read_at = index;
    }

    /// Per-index read latency in milliseconds (missing entries mean no delay).
    pub fn set_read_delays(&self, delays_ms: Vec<u64>) {
        self.state.lock().unwrap().read_delays_ms = delays_ms;
    }

    /// Insert an already finalized record directly (test setup).
    pub fn push_record(&self, content_ref: ContentRef, title: &str, author: &str, timestamp: Millis) {
        let mut state = self.state.lock().unwrap();
        let sequence_index = state.records.len() as u64;
        state.records.push(IndexRecord {
            content_ref,
            title: title.to_string(),
            timestamp,
            author: Address::new(author),
            sequence_index,
        });
    }

    /// Every write submitted, finalized or not, for assertions.
    pub fn submitted_writes(&self) -> Vec<(ContentRef, String)> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn check_available(state: &MockState) -> LedgerResult<()> {
        if state.unavailable {
            Err(LedgerError::Unavailable("mock ledger unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerTransport for MockLedger {
    async fn write_index_record(
        &self,
        content_ref: &ContentRef,
        title: &str,
        author: &Address,
    ) -> LedgerResult<PendingWrite> {
        let mut state = self.state.lock().unwrap();
        Self::check_available(&state)?;

        let id = format!("0x{:064x}", state.next_pending);
        state.next_pending += 1;
        state.submitted.push((content_ref.clone(), title.to_string()));
        state.pending.insert(
            id.clone(),
            PendingEntry {
                content_ref: content_ref.clone(),
                title: title.to_string(),
                author: author.clone(),
                polls: 0,
                outcome: None,
            },
        );
        Ok(PendingWrite { id })
    }

    async fn finalization(&self, pending: &PendingWrite) -> LedgerResult<Finalization> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        Self::check_available(state)?;

        let entry = state
            .pending
            .get_mut(&pending.id)
            .ok_or_else(|| LedgerError::Rejected(format!("unknown write {}", pending.id)))?;

        if let Some(outcome) = &entry.outcome {
            return Ok(outcome.clone());
        }
        if state.never_finalize || entry.polls < state.polls_before_finalize {
            entry.polls += 1;
            return Ok(Finalization::Pending);
        }

        let outcome = match &state.reject_reason {
            Some(reason) => Finalization::Rejected(reason.clone()),
            None => {
                let sequence_index = state.records.len() as u64;
                state.records.push(IndexRecord {
                    content_ref: entry.content_ref.clone(),
                    title: entry.title.clone(),
                    timestamp: state.fixed_timestamp.unwrap_or_else(now_millis),
                    author: entry.author.clone(),
                    sequence_index,
                });
                Finalization::Finalized { sequence_index }
            }
        };
        entry.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    async fn read_count(&self) -> LedgerResult<u64> {
        let state = self.state.lock().unwrap();
        Self::check_available(&state)?;
        Ok(state.records.len() as u64)
    }

    async fn read_index_record(&self, index: u64) -> LedgerResult<IndexRecord> {
        let delay = {
            let state = self.state.lock().unwrap();
            Self::check_available(&state)?;
            state.read_delays_ms.get(index as usize).copied().unwrap_or(0)
        };
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let state = self.state.lock().unwrap();
        if state.fail_read_at == Some(index) {
            return Err(LedgerError::Unavailable(format!("read of {} failed", index)));
        }
        state
            .records
            .get(index as usize)
            .cloned()
            .ok_or(LedgerError::NotFound { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_finalize() {
        let ledger = MockLedger::new();
        let pending = ledger
            .write_index_record(&ContentRef::new("ipfs://a"), "A", &Address::new("0xabc"))
            .await
            .unwrap();

        assert_eq!(ledger.read_count().await.unwrap(), 0);
        let outcome = ledger.finalization(&pending).await.unwrap();
        assert_eq!(outcome, Finalization::Finalized { sequence_index: 0 });

        // Polling again reports the same outcome without a second record.
        assert_eq!(ledger.finalization(&pending).await.unwrap(), outcome);
        assert_eq!(ledger.read_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fixed_timestamp() {
        let ledger = MockLedger::new();
        ledger.set_timestamp(Some(1234));
        let pending = ledger
            .write_index_record(&ContentRef::new("ipfs://a"), "A", &Address::new("0xabc"))
            .await
            .unwrap();
        ledger.finalization(&pending).await.unwrap();

        assert_eq!(ledger.read_index_record(0).await.unwrap().timestamp, 1234);
    }

    #[tokio::test]
    async fn test_push_record_assigns_dense_indices() {
        let ledger = MockLedger::new();
        ledger.push_record(ContentRef::new("a"), "A", "0x1", 10);
        ledger.push_record(ContentRef::new("b"), "B", "0x2", 20);

        assert_eq!(ledger.read_index_record(1).await.unwrap().sequence_index, 1);
        assert_eq!(
            ledger.read_index_record(2).await,
            Err(LedgerError::NotFound { index: 2 })
        );
    }
}
