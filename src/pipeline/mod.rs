//! The submission and verification pipeline.
//!
//! - `submission`: write path (score, store, commit)
//! - `feed`: read path (enumerate, resolve, sort, filter)

pub mod feed;
pub mod submission;

pub use feed::{
    EntryError, FeedAggregator, FeedError, FeedFilter, FeedSnapshot, VerificationFilter,
};
pub use submission::{
    Stage, StageError, Submission, SubmissionContent, SubmissionError, SubmissionOrchestrator,
    SubmissionReceipt,
};
