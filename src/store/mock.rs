//! In-memory content-addressed store for testing.
//!
//! References are `sha256://<hex digest of payload bytes>`, so identical
//! payloads always land on the same key.

use super::traits::*;
use crate::model::{ContentPayload, ContentRef};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Derive the content reference for serialized payload bytes.
pub fn content_address(bytes: &[u8]) -> ContentRef {
    let digest = Sha256::digest(bytes);
    ContentRef::new(format!("sha256://{}", hex::encode(digest)))
}

/// Mock content store.
#[derive(Clone)]
pub struct MockContentStore {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    blobs: HashMap<String, Vec<u8>>,
    put_calls: usize,
    get_calls: usize,
    unavailable: bool,
    failing_keys: HashSet<String>,
    get_delay_ms: u64,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Make every call fail as unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Make `get` of one reference fail as unreachable.
    pub fn fail_get_for(&self, reference: &ContentRef) {
        self.state
            .lock()
            .unwrap()
            .failing_keys
            .insert(reference.key().to_string());
    }

    /// Delay every `get` (for timeout tests).
    pub fn set_get_delay(&self, delay_ms: u64) {
        self.state.lock().unwrap().get_delay_ms = delay_ms;
    }

    /// Drop a stored payload, as if the store lost it.
    pub fn forget(&self, reference: &ContentRef) {
        self.state.lock().unwrap().blobs.remove(reference.key());
    }

    /// Raw stored bytes for a reference.
    pub fn raw_bytes(&self, reference: &ContentRef) -> Option<Vec<u8>> {
        self.state.lock().unwrap().blobs.get(reference.key()).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn put_calls(&self) -> usize {
        self.state.lock().unwrap().put_calls
    }

    pub fn get_calls(&self) -> usize {
        self.state.lock().unwrap().get_calls
    }
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn put(&self, payload: &ContentPayload) -> StoreResult<ContentRef> {
        let bytes = payload
            .to_bytes()
            .map_err(|e| StoreError::Unavailable(format!("encode failed: {}", e)))?;

        let mut state = self.state.lock().unwrap();
        state.put_calls += 1;
        if state.unavailable {
            return Err(StoreError::Unavailable("mock store unreachable".to_string()));
        }

        let reference = content_address(&bytes);
        state.blobs.insert(reference.key().to_string(), bytes);
        Ok(reference)
    }

    async fn get(&self, reference: &ContentRef) -> StoreResult<ContentPayload> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.get_calls += 1;
            state.get_delay_ms
        };
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let bytes = {
            let state = self.state.lock().unwrap();
            if state.unavailable || state.failing_keys.contains(reference.key()) {
                return Err(StoreError::Unavailable("mock store unreachable".to_string()));
            }
            state
                .blobs
                .get(reference.key())
                .cloned()
                .ok_or_else(|| StoreError::NotFound {
                    reference: reference.key().to_string(),
                })?
        };

        ContentPayload::from_bytes(&bytes)
            .map_err(|e| StoreError::Unavailable(format!("malformed payload: {}", e)))
    }
}
