//! Credibility scorer with neutral fallback.
//!
//! A scoring failure never blocks a submission: malformed replies, out-of-range
//! values, transport errors and timeouts all resolve to the neutral score.

use super::traits::*;
use crate::model::CredibilityScore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default scorer timeout.
pub const DEFAULT_SCORER_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct CredibilityScorer {
    backend: Arc<dyn ScoringBackend>,
    timeout: Duration,
}

impl CredibilityScorer {
    pub fn new(backend: Arc<dyn ScoringBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Score a title and body, degrading to neutral on any failure.
    pub async fn score(&self, title: &str, body: &str) -> CredibilityScore {
        match self.try_score(title, body).await {
            Ok(score) => {
                debug!(score = score.value(), "credibility scored");
                score
            }
            Err(e) => {
                warn!(error = %e, "scoring degraded to neutral");
                CredibilityScore::neutral()
            }
        }
    }

    /// Score without the fallback.
    pub async fn try_score(&self, title: &str, body: &str) -> Result<CredibilityScore, ScoringError> {
        let raw = tokio::time::timeout(self.timeout, self.backend.raw_score(title, body))
            .await
            .map_err(|_| ScoringError::Timeout(self.timeout.as_millis() as u64))??;
        parse_score(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NEUTRAL_SCORE;
    use crate::scorer::mock::MockScoringBackend;

    fn scorer(backend: &MockScoringBackend) -> CredibilityScorer {
        CredibilityScorer::new(Arc::new(backend.clone()), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_valid_reply() {
        let backend = MockScoringBackend::replying("0.9");
        assert_eq!(scorer(&backend).score("A", "B").await.value(), 0.9);
        assert_eq!(backend.calls(), vec![("A".to_string(), "B".to_string())]);
    }

    #[tokio::test]
    async fn test_out_of_range_is_neutral() {
        let backend = MockScoringBackend::replying("7");
        assert_eq!(scorer(&backend).score("A", "B").await.value(), NEUTRAL_SCORE);
    }

    #[tokio::test]
    async fn test_non_numeric_is_neutral() {
        let backend = MockScoringBackend::replying("I think 0.8");
        assert_eq!(scorer(&backend).score("A", "B").await.value(), NEUTRAL_SCORE);
    }

    #[tokio::test]
    async fn test_transport_failure_is_neutral() {
        let backend = MockScoringBackend::failing(ScoringError::Transport("refused".to_string()));
        assert_eq!(scorer(&backend).score("A", "B").await.value(), NEUTRAL_SCORE);
    }

    #[tokio::test]
    async fn test_timeout_is_neutral() {
        let backend = MockScoringBackend::replying("0.9");
        backend.set_delay(Duration::from_millis(500));
        let s = scorer(&backend);

        assert_eq!(s.try_score("A", "B").await, Err(ScoringError::Timeout(50)));
        assert_eq!(s.score("A", "B").await.value(), NEUTRAL_SCORE);
    }
}
