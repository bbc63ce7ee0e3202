//! HTTP content store backend.
//!
//! ```text
//! POST upload       ContentPayload JSON -> {uri: "scheme://key[/path]"}
//! GET  fetch/{key}  -> ContentPayload JSON
//! ```

use super::traits::*;
use crate::model::{ContentPayload, ContentRef};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

/// Content store reached through an HTTP API.
pub struct HttpContentStore {
    client: reqwest::Client,
    base: Url,
}

#[derive(Deserialize)]
struct UploadResponse {
    uri: String,
}

impl HttpContentStore {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Base URL extended by percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable(format!("invalid store url: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Keys that cannot name a single path segment; `url` drops dot segments silently.
fn is_unroutable(key: &str) -> bool {
    matches!(key, "" | "." | "..")
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, payload: &ContentPayload) -> StoreResult<ContentRef> {
        let response = self
            .client
            .post(self.endpoint(&["upload"])?)
            .json(payload)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "upload failed with {}",
                response.status()
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("malformed upload response: {}", e)))?;

        if uploaded.uri.trim().is_empty() {
            return Err(StoreError::Unavailable("store returned an empty reference".to_string()));
        }
        Ok(ContentRef::new(uploaded.uri))
    }

    async fn get(&self, reference: &ContentRef) -> StoreResult<ContentPayload> {
        let key = reference.key();
        if is_unroutable(key) {
            return Err(StoreError::NotFound {
                reference: key.to_string(),
            });
        }
        let response = self
            .client
            .get(self.endpoint(&["fetch", key])?)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(StoreError::NotFound {
                    reference: key.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(StoreError::Unavailable(format!("fetch failed with {}", status)))
            }
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Unavailable(format!("malformed payload: {}", e)))
    }
}
