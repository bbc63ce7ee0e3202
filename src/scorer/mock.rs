//! Mock scoring backend for testing.

use super::traits::*;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock scorer with a canned reply or failure.
#[derive(Clone)]
pub struct MockScoringBackend {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    reply: Result<String, ScoringError>,
    delay: Duration,
    calls: Vec<(String, String)>,
}

impl MockScoringBackend {
    pub fn replying(reply: &str) -> Self {
        Self::with_reply(Ok(reply.to_string()))
    }

    pub fn failing(error: ScoringError) -> Self {
        Self::with_reply(Err(error))
    }

    fn with_reply(reply: Result<String, ScoringError>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                reply,
                delay: Duration::ZERO,
                calls: Vec::new(),
            })),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = delay;
    }

    /// Every (title, body) scored, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ScoringBackend for MockScoringBackend {
    async fn raw_score(&self, title: &str, body: &str) -> Result<String, ScoringError> {
        let (reply, delay) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((title.to_string(), body.to_string()));
            (state.reply.clone(), state.delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}
