//! Content store client: per-call timeout and logging over a backend.

use super::traits::*;
use crate::model::{ContentPayload, ContentRef};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default per-call timeout.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(15);

/// Client over a [`ContentStore`] backend. Performs no retries.
#[derive(Clone)]
pub struct ContentStoreClient {
    backend: Arc<dyn ContentStore>,
    request_timeout: Duration,
}

impl ContentStoreClient {
    pub fn new(backend: Arc<dyn ContentStore>, request_timeout: Duration) -> Self {
        Self {
            backend,
            request_timeout,
        }
    }

    pub async fn put(&self, payload: &ContentPayload) -> StoreResult<ContentRef> {
        let reference = self.bounded(self.backend.put(payload)).await?;
        debug!(content_ref = %reference, "payload stored");
        Ok(reference)
    }

    pub async fn get(&self, reference: &ContentRef) -> StoreResult<ContentPayload> {
        let result = self.bounded(self.backend.get(reference)).await;
        if let Err(e) = &result {
            debug!(content_ref = %reference, error = %e, "payload fetch failed");
        }
        result
    }

    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "request timed out after {}ms",
                self.request_timeout.as_millis()
            ))),
        }
    }
}
