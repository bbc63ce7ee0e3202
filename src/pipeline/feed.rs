//! Feed aggregator: the read path.
//!
//! Lists every index record, resolves each to its stored content concurrently,
//! and sorts newest first. A record whose content cannot be fetched stays in
//! the feed as a degraded entry; only a failure to enumerate the ledger fails
//! the whole build. Filters narrow the sorted feed and never reorder it.

use crate::fanout::resolve_ordered;
use crate::ledger::{LedgerClient, LedgerError};
use crate::model::{ContentRef, FeedEntry, IndexRecord, Verdict};
use crate::store::ContentStoreClient;
use tracing::{debug, warn};

/// Verification-state selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationFilter {
    #[default]
    All,
    /// Score at or above [`Verdict::VERIFIED_THRESHOLD`].
    Verified,
    /// Score below [`Verdict::VERIFIED_THRESHOLD`].
    Unverified,
}

/// Caller-supplied feed predicates. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    /// Case-insensitive substring matched against title or body.
    pub search: Option<String>,
    /// Minimum credibility score, inclusive.
    pub min_score: Option<f64>,
    pub verification: VerificationFilter,
}

impl FeedFilter {
    pub fn matches(&self, entry: &FeedEntry) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            if !entry.title.to_lowercase().contains(&term)
                && !entry.body.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        let score = entry.credibility_score.value();
        if let Some(min) = self.min_score {
            if score < min {
                return false;
            }
        }

        match self.verification {
            VerificationFilter::All => true,
            VerificationFilter::Verified => score >= Verdict::VERIFIED_THRESHOLD,
            VerificationFilter::Unverified => score < Verdict::VERIFIED_THRESHOLD,
        }
    }

    /// Matching entries, in their original order.
    pub fn apply(&self, entries: &[FeedEntry]) -> Vec<FeedEntry> {
        entries.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

/// Whole-feed failure: the ledger could not be enumerated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to enumerate ledger: {0}")]
    Ledger(#[from] LedgerError),
}

impl FeedError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FeedError::Ledger(e) => e.is_retryable(),
        }
    }
}

/// Single-entry lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("No index record references {0}")]
    NotFound(String),

    #[error("Failed to enumerate ledger: {0}")]
    Ledger(#[from] LedgerError),
}

impl EntryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EntryError::Ledger(e) if e.is_retryable())
    }
}

/// A built feed plus the ledger position it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub entries: Vec<FeedEntry>,
    /// First sequence index not covered; a watch started here misses nothing.
    pub next_index: u64,
}

/// Joins the ledger index with stored content.
#[derive(Clone)]
pub struct FeedAggregator {
    ledger: LedgerClient,
    store: ContentStoreClient,
    fanout_limit: usize,
}

impl FeedAggregator {
    pub fn new(ledger: LedgerClient, store: ContentStoreClient, fanout_limit: usize) -> Self {
        Self {
            ledger,
            store,
            fanout_limit,
        }
    }

    /// Build the feed, newest first, optionally narrowed by `filter`.
    ///
    /// Side-effect free; repeated calls differ only if the ledger or store changed.
    pub async fn build_feed(&self, filter: Option<&FeedFilter>) -> Result<Vec<FeedEntry>, FeedError> {
        Ok(self.build_feed_snapshot(filter).await?.entries)
    }

    /// Like [`build_feed`](Self::build_feed), also reporting the position the
    /// feed was enumerated up to.
    pub async fn build_feed_snapshot(
        &self,
        filter: Option<&FeedFilter>,
    ) -> Result<FeedSnapshot, FeedError> {
        let next_index = self.ledger.count().await?;
        let records = self.ledger.list_prefix(next_index).await?;
        let mut entries = self.resolve(records).await;
        entries.sort_by(FeedEntry::feed_order);

        let degraded = entries.iter().filter(|e| e.is_degraded()).count();
        debug!(entries = entries.len(), degraded, next_index, "feed built");

        let entries = match filter {
            Some(filter) => filter.apply(&entries),
            None => entries,
        };
        Ok(FeedSnapshot {
            entries,
            next_index,
        })
    }

    /// Entry for a content reference (any scheme/path form).
    ///
    /// Only indexed content is visible; orphaned payloads are `NotFound`. With
    /// duplicate submissions the most recently committed record wins.
    pub async fn entry(&self, content_ref: &ContentRef) -> Result<FeedEntry, EntryError> {
        let records = self.ledger.list_all().await?;
        let record = records
            .into_iter()
            .filter(|r| r.content_ref.same_content(content_ref))
            .max_by_key(|r| r.sequence_index)
            .ok_or_else(|| EntryError::NotFound(content_ref.key().to_string()))?;

        Ok(self.resolve_record(record).await)
    }

    /// Resolve records to entries in input order, degrading per item.
    pub async fn resolve(&self, records: Vec<IndexRecord>) -> Vec<FeedEntry> {
        resolve_ordered(records, self.fanout_limit, |record| self.resolve_record(record)).await
    }

    /// Resolve one record; a store failure yields a degraded entry.
    pub async fn resolve_record(&self, record: IndexRecord) -> FeedEntry {
        match self.store.get(&record.content_ref).await {
            Ok(payload) => FeedEntry::resolved(record, payload),
            Err(e) => {
                warn!(
                    sequence_index = record.sequence_index,
                    content_ref = %record.content_ref,
                    error = %e,
                    "content unresolved, emitting degraded entry"
                );
                FeedEntry::degraded(record)
            }
        }
    }
}
