//! Scoring backend abstraction.
//!
//! Backends return the scorer's raw reply; parsing and range checks happen in
//! one place ([`parse_score`]) so every backend fails the same way.

use crate::model::CredibilityScore;
use async_trait::async_trait;

/// Scoring failures. Never surfaced past [`super::CredibilityScorer`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("Scorer transport error: {0}")]
    Transport(String),

    #[error("Malformed scorer response: {0}")]
    Malformed(String),

    #[error("Score out of range: {0}")]
    OutOfRange(f64),

    #[error("Scorer timed out after {0}ms")]
    Timeout(u64),
}

/// Credibility scoring service.
#[async_trait]
pub trait ScoringBackend: Send + Sync {
    /// Raw reply for a title and body; expected to be a single number.
    async fn raw_score(&self, title: &str, body: &str) -> Result<String, ScoringError>;
}

/// Parse a scorer reply into a score in `[0, 1]`.
pub fn parse_score(raw: &str) -> Result<CredibilityScore, ScoringError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ScoringError::Malformed(trimmed.to_string()))?;
    CredibilityScore::new(value).ok_or(ScoringError::OutOfRange(value))
}
