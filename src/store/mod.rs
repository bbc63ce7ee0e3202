//! Content-addressed payload storage.

pub mod client;
pub mod http;
pub mod mock;
pub mod traits;

pub use client::{ContentStoreClient, DEFAULT_STORE_TIMEOUT};
pub use http::HttpContentStore;
pub use mock::{content_address, MockContentStore};
pub use traits::{ContentStore, StoreError, StoreResult};
