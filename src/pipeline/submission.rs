//! Submission orchestrator: the write path.
//!
//! ```text
//! Idle -> Scoring -> Storing -> Committing -> Done
//!   \________\__________\___________\______-> Failed
//! ```
//!
//! Content is stored before the index record referencing it is committed. A
//! commit failure leaves the stored payload orphaned; nothing indexes it, so
//! readers never see it, and it is not cleaned up.

use crate::identity::IdentityProvider;
use crate::ledger::{LedgerClient, LedgerError};
use crate::model::{now_millis, Address, ContentPayload, ContentRef, CredibilityScore, Millis};
use crate::scorer::CredibilityScorer;
use crate::store::{ContentStoreClient, StoreError};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// What is being submitted besides the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionContent {
    /// Free text body; the only kind that gets scored.
    Text(String),
    /// An uploaded file, recorded by name.
    File { name: String },
    /// An external link, recorded by URL.
    Link(String),
}

/// One submission as entered by the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub title: String,
    pub content: SubmissionContent,
}

impl Submission {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: SubmissionContent::Text(body.into()),
        }
    }

    pub fn file(title: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: SubmissionContent::File { name: name.into() },
        }
    }

    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: SubmissionContent::Link(url.into()),
        }
    }

    /// Body stored in the payload: the text, or a surrogate for files and links.
    pub fn body(&self) -> &str {
        match &self.content {
            SubmissionContent::Text(body) => body,
            SubmissionContent::File { name } => name,
            SubmissionContent::Link(url) => url,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self.content, SubmissionContent::Text(_))
    }

    fn validate(&self) -> Result<(), SubmissionError> {
        if self.title.trim().is_empty() {
            return Err(SubmissionError::Invalid("a title is required".to_string()));
        }
        let missing = match &self.content {
            SubmissionContent::Text(body) if body.trim().is_empty() => Some("text body"),
            SubmissionContent::File { name } if name.trim().is_empty() => Some("file"),
            SubmissionContent::Link(url) if url.trim().is_empty() => Some("link"),
            _ => None,
        };
        match missing {
            Some(what) => Err(SubmissionError::Invalid(format!("a {} is required", what))),
            None => Ok(()),
        }
    }
}

/// Position in the submission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Scoring,
    Storing,
    Committing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Scoring => "scoring",
            Stage::Storing => "storing",
            Stage::Committing => "committing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Underlying cause of a failed stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("no identity is bound")]
    IdentityUnavailable,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Write-path errors, tagged with the stage they occurred in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid submission: {0}")]
    Invalid(String),

    #[error("Submission failed while {stage}: {cause}")]
    Failed {
        stage: Stage,
        #[source]
        cause: StageError,
    },
}

impl SubmissionError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SubmissionError::Invalid(_) => None,
            SubmissionError::Failed { stage, .. } => Some(*stage),
        }
    }

    /// True when nothing reached the ledger and the store was merely unreachable,
    /// so the whole submission can be repeated from `Idle`.
    pub fn is_retryable_from_idle(&self) -> bool {
        matches!(
            self,
            SubmissionError::Failed {
                stage: Stage::Storing,
                cause: StageError::Store(StoreError::Unavailable(_)),
            }
        )
    }
}

/// Outcome of a finalized submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub content_ref: ContentRef,
    pub sequence_index: u64,
    pub author: Address,
    pub timestamp: Millis,
    pub credibility_score: CredibilityScore,
}

type Clock = Arc<dyn Fn() -> Millis + Send + Sync>;

/// Composes scorer, content store and ledger into the write path.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    identity: Arc<dyn IdentityProvider>,
    scorer: CredibilityScorer,
    store: ContentStoreClient,
    ledger: LedgerClient,
    clock: Clock,
}

impl SubmissionOrchestrator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        scorer: CredibilityScorer,
        store: ContentStoreClient,
        ledger: LedgerClient,
    ) -> Self {
        Self {
            identity,
            scorer,
            store,
            ledger,
            clock: Arc::new(now_millis),
        }
    }

    /// Replace the wall clock used to timestamp payloads.
    pub fn with_clock(mut self, clock: impl Fn() -> Millis + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Run one submission to `Done`, or fail with the stage it stopped at.
    ///
    /// Success is declared only after the ledger finalizes the index record.
    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmissionError> {
        submission.validate()?;

        let author = self
            .identity
            .current_address()
            .ok_or(SubmissionError::Failed {
                stage: Stage::Idle,
                cause: StageError::IdentityUnavailable,
            })?;

        info!(stage = %Stage::Scoring, title = %submission.title, "submission started");
        let credibility_score = if submission.is_textual() {
            self.scorer.score(&submission.title, submission.body()).await
        } else {
            CredibilityScore::neutral()
        };

        let timestamp = (self.clock)();
        let payload = ContentPayload {
            title: submission.title.clone(),
            body: submission.body().to_string(),
            author: author.clone(),
            timestamp,
            credibility_score: credibility_score.value(),
        };

        info!(stage = %Stage::Storing, score = credibility_score.value(), "storing payload");
        let content_ref = self
            .store
            .put(&payload)
            .await
            .map_err(|e| fail(Stage::Storing, e))?;

        info!(stage = %Stage::Committing, content_ref = %content_ref, "committing index record");
        let receipt = match self.ledger.commit(&content_ref, &submission.title).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(content_ref = %content_ref, error = %e, "commit failed; stored payload is orphaned");
                return Err(fail(Stage::Committing, e));
            }
        };

        info!(
            stage = %Stage::Done,
            sequence_index = receipt.sequence_index,
            content_ref = %content_ref,
            "submission finalized"
        );
        Ok(SubmissionReceipt {
            content_ref,
            sequence_index: receipt.sequence_index,
            author,
            timestamp,
            credibility_score,
        })
    }
}

fn fail(stage: Stage, cause: impl Into<StageError>) -> SubmissionError {
    SubmissionError::Failed {
        stage,
        cause: cause.into(),
    }
}
