//! Ledger client: commit with finalization wait, ordered enumeration, watch.

use super::traits::*;
use crate::fanout::{resolve_ordered, DEFAULT_FANOUT_LIMIT};
use crate::identity::IdentityProvider;
use crate::model::{ContentRef, IndexRecord};
use futures::stream::{self, Stream};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeouts and limits for ledger calls.
#[derive(Debug, Clone)]
pub struct LedgerClientConfig {
    /// Per-request timeout for reads and write submission.
    pub request_timeout: Duration,
    /// Upper bound on waiting for a submitted write to finalize.
    pub finalization_timeout: Duration,
    /// Delay between finalization polls.
    pub poll_interval: Duration,
    /// Maximum concurrent record fetches in `list_all`.
    pub fanout_limit: usize,
}

impl Default for LedgerClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            finalization_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
            fanout_limit: DEFAULT_FANOUT_LIMIT,
        }
    }
}

/// Successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub sequence_index: u64,
}

/// Client over a [`LedgerTransport`], attributing writes to the bound identity.
#[derive(Clone)]
pub struct LedgerClient {
    transport: Arc<dyn LedgerTransport>,
    identity: Arc<dyn IdentityProvider>,
    config: LedgerClientConfig,
}

impl LedgerClient {
    pub fn new(
        transport: Arc<dyn LedgerTransport>,
        identity: Arc<dyn IdentityProvider>,
        config: LedgerClientConfig,
    ) -> Self {
        Self {
            transport,
            identity,
            config,
        }
    }

    /// Commit an index record and block until the ledger finalizes it.
    ///
    /// Returns only after finalization. A write that is submitted but not
    /// finalized within `finalization_timeout` is reported as `Rejected`; the
    /// write may still land server-side.
    pub async fn commit(&self, content_ref: &ContentRef, title: &str) -> LedgerResult<CommitReceipt> {
        let author = self
            .identity
            .current_address()
            .ok_or(LedgerError::IdentityUnavailable)?;

        let pending = self
            .bounded(self.transport.write_index_record(content_ref, title, &author))
            .await?;
        debug!(pending = %pending.id, content_ref = %content_ref, "ledger write submitted");

        let waited =
            tokio::time::timeout(self.config.finalization_timeout, self.await_finalization(&pending))
                .await;

        match waited {
            Ok(Ok(sequence_index)) => {
                info!(
                    sequence_index,
                    content_ref = %content_ref,
                    author = %author,
                    "index record finalized"
                );
                Ok(CommitReceipt { sequence_index })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LedgerError::Rejected(format!(
                "finalization not observed within {}ms",
                self.config.finalization_timeout.as_millis()
            ))),
        }
    }

    async fn await_finalization(&self, pending: &PendingWrite) -> LedgerResult<u64> {
        loop {
            match self.bounded(self.transport.finalization(pending)).await {
                Ok(Finalization::Finalized { sequence_index }) => return Ok(sequence_index),
                Ok(Finalization::Rejected(reason)) => return Err(LedgerError::Rejected(reason)),
                Ok(Finalization::Pending) => {}
                // The write is already out; a failed poll says nothing about its fate.
                Err(e) => warn!(pending = %pending.id, error = %e, "finalization poll failed"),
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Total number of committed records.
    pub async fn count(&self) -> LedgerResult<u64> {
        self.bounded(self.transport.read_count()).await
    }

    /// Record at `sequence_index`; positions at or past `count()` are `NotFound`.
    pub async fn get(&self, sequence_index: u64) -> LedgerResult<IndexRecord> {
        if sequence_index >= self.count().await? {
            return Err(LedgerError::NotFound {
                index: sequence_index,
            });
        }
        self.fetch(sequence_index).await
    }

    /// Read a position already known to be below the count.
    async fn fetch(&self, sequence_index: u64) -> LedgerResult<IndexRecord> {
        let mut record = self
            .bounded(self.transport.read_index_record(sequence_index))
            .await?;
        // Position is authoritative for ordering.
        record.sequence_index = sequence_index;
        Ok(record)
    }

    /// Every record in `sequence_index` order, fetched concurrently.
    pub async fn list_all(&self) -> LedgerResult<Vec<IndexRecord>> {
        let count = self.count().await?;
        self.list_prefix(count).await
    }

    /// Records `0..count` in `sequence_index` order, fetched concurrently.
    ///
    /// `count` must not exceed a count the ledger has reported; records are
    /// never removed, so every position below it stays readable.
    pub async fn list_prefix(&self, count: u64) -> LedgerResult<Vec<IndexRecord>> {
        debug!(count, "enumerating ledger");

        let fetched = resolve_ordered(
            (0..count).collect(),
            self.config.fanout_limit,
            |index| self.fetch(index),
        )
        .await;

        fetched.into_iter().collect()
    }

    /// Stream of records committed at or after `start`, found by polling `count`.
    ///
    /// Failed reads are yielded as errors and retried on the next poll; the
    /// stream never skips a position.
    pub fn watch_from(
        &self,
        start: u64,
        poll_interval: Duration,
    ) -> impl Stream<Item = LedgerResult<IndexRecord>> + '_ {
        stream::unfold(WatchCursor { next: start, known: start }, move |mut cursor| async move {
            loop {
                if cursor.next < cursor.known {
                    return match self.fetch(cursor.next).await {
                        Ok(record) => {
                            cursor.next += 1;
                            Some((Ok(record), cursor))
                        }
                        Err(e) => {
                            tokio::time::sleep(poll_interval).await;
                            Some((Err(e), cursor))
                        }
                    };
                }
                match self.count().await {
                    Ok(count) if count > cursor.next => cursor.known = count,
                    Ok(_) => tokio::time::sleep(poll_interval).await,
                    Err(e) => {
                        tokio::time::sleep(poll_interval).await;
                        return Some((Err(e), cursor));
                    }
                }
            }
        })
    }

    /// Apply the per-request timeout; a timeout is a transport failure.
    async fn bounded<T>(&self, call: impl Future<Output = LedgerResult<T>>) -> LedgerResult<T> {
        match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Unavailable(format!(
                "request timed out after {}ms",
                self.config.request_timeout.as_millis()
            ))),
        }
    }
}

struct WatchCursor {
    next: u64,
    known: u64,
}
