//! Presentation-facing API.
//!
//! `Newsroom` wires the clients into the write and read paths and exposes the
//! three calls a UI needs: `submit`, `list_feed`, `get_entry`. Caller-side
//! retry policy lives here, not in the clients.

use crate::identity::{address_changes, IdentityProvider, IdentityResult};
use crate::ledger::{LedgerClient, LedgerClientConfig, LedgerError, LedgerTransport};
use crate::model::{Address, ContentRef, FeedEntry};
use crate::pipeline::{
    EntryError, FeedAggregator, FeedError, FeedFilter, FeedSnapshot, Submission,
    SubmissionError, SubmissionOrchestrator, SubmissionReceipt,
};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::scorer::{CredibilityScorer, ScoringBackend, DEFAULT_SCORER_TIMEOUT};
use crate::store::{ContentStore, ContentStoreClient, DEFAULT_STORE_TIMEOUT};
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// External systems the pipeline talks to.
#[derive(Clone)]
pub struct Backends {
    pub identity: Arc<dyn IdentityProvider>,
    pub ledger: Arc<dyn LedgerTransport>,
    pub store: Arc<dyn ContentStore>,
    pub scorer: Arc<dyn ScoringBackend>,
}

/// Timeouts, limits and retry policy.
#[derive(Debug, Clone)]
pub struct NewsroomSettings {
    pub ledger: LedgerClientConfig,
    pub store_timeout: Duration,
    pub scorer_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for NewsroomSettings {
    fn default() -> Self {
        Self {
            ledger: LedgerClientConfig::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            scorer_timeout: DEFAULT_SCORER_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct Newsroom {
    identity: Arc<dyn IdentityProvider>,
    author: watch::Receiver<Option<Address>>,
    ledger: LedgerClient,
    orchestrator: SubmissionOrchestrator,
    feed: FeedAggregator,
    retry: RetryPolicy,
}

impl Newsroom {
    pub fn new(backends: Backends, settings: NewsroomSettings) -> Self {
        let fanout_limit = settings.ledger.fanout_limit;
        let ledger = LedgerClient::new(
            backends.ledger,
            backends.identity.clone(),
            settings.ledger,
        );
        let store = ContentStoreClient::new(backends.store, settings.store_timeout);
        let scorer = CredibilityScorer::new(backends.scorer, settings.scorer_timeout);

        Self {
            author: backends.identity.subscribe(),
            orchestrator: SubmissionOrchestrator::new(
                backends.identity.clone(),
                scorer,
                store.clone(),
                ledger.clone(),
            ),
            feed: FeedAggregator::new(ledger.clone(), store, fanout_limit),
            identity: backends.identity,
            ledger,
            retry: settings.retry,
        }
    }

    /// Address submissions will be attributed to, as of the latest change notification.
    pub fn current_author(&self) -> Option<Address> {
        self.author.borrow().clone()
    }

    /// Ask the identity provider for an address (may prompt).
    pub async fn request_identity(&self) -> IdentityResult<Address> {
        self.identity.request_address().await
    }

    /// Address-changed notifications, starting with the current address.
    pub fn identity_changes(&self) -> WatchStream<Option<Address>> {
        address_changes(self.identity.as_ref())
    }

    /// Submit, retrying only failures that never reached the ledger.
    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmissionError> {
        retry_with_backoff(
            &self.retry,
            || self.orchestrator.submit(submission),
            SubmissionError::is_retryable_from_idle,
        )
        .await
    }

    /// Newest-first feed narrowed by `filter`.
    pub async fn list_feed(&self, filter: &FeedFilter) -> Result<Vec<FeedEntry>, FeedError> {
        retry_with_backoff(
            &self.retry,
            || self.feed.build_feed(Some(filter)),
            FeedError::is_retryable,
        )
        .await
    }

    /// [`list_feed`](Self::list_feed) plus the position to follow from.
    pub async fn list_feed_snapshot(&self, filter: &FeedFilter) -> Result<FeedSnapshot, FeedError> {
        retry_with_backoff(
            &self.retry,
            || self.feed.build_feed_snapshot(Some(filter)),
            FeedError::is_retryable,
        )
        .await
    }

    /// Single entry by content reference, in any `scheme://key/path` form.
    pub async fn get_entry(&self, content_ref: &ContentRef) -> Result<FeedEntry, EntryError> {
        retry_with_backoff(
            &self.retry,
            || self.feed.entry(content_ref),
            EntryError::is_retryable,
        )
        .await
    }

    /// Entries committed from now on, resolved as they appear.
    pub async fn follow(
        &self,
        poll_interval: Duration,
    ) -> Result<impl Stream<Item = Result<FeedEntry, LedgerError>> + '_, LedgerError> {
        let start = self.ledger.count().await?;
        Ok(self.follow_from(start, poll_interval))
    }

    /// Entries at `start` and after, resolved as they appear. Pass a
    /// snapshot's `next_index` to continue a listing without a gap.
    pub fn follow_from(
        &self,
        start: u64,
        poll_interval: Duration,
    ) -> impl Stream<Item = Result<FeedEntry, LedgerError>> + '_ {
        self.ledger
            .watch_from(start, poll_interval)
            .then(move |record| async move {
                match record {
                    Ok(record) => Ok(self.feed.resolve_record(record).await),
                    Err(e) => Err(e),
                }
            })
    }
}
