//! Credibility scoring: an enrichment, never a blocker.

pub mod client;
pub mod http;
pub mod mock;
pub mod traits;

pub use client::{CredibilityScorer, DEFAULT_SCORER_TIMEOUT};
pub use http::{ChatCompletionBackend, HttpScoringBackend};
pub use mock::MockScoringBackend;
pub use traits::{parse_score, ScoringBackend, ScoringError};
