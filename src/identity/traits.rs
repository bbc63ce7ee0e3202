//! Identity provider abstraction.
//!
//! The provider is passed explicitly to whatever needs the caller's address.
//! Address changes are delivered through a `watch` subscription so holders of
//! a cached identity can invalidate it.

use crate::model::Address;
use async_trait::async_trait;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("No identity is bound")]
    Unavailable,

    #[error("Identity request rejected: {0}")]
    Rejected(String),
}

/// Supplies the caller's stable pseudonymous address.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Currently bound address, if any. Never prompts.
    fn current_address(&self) -> Option<Address>;

    /// Ask for an address, possibly prompting a human.
    ///
    /// Slow and cancellable: dropping the future abandons the request.
    async fn request_address(&self) -> IdentityResult<Address>;

    /// Subscribe to address changes. The receiver starts at the current value.
    fn subscribe(&self) -> watch::Receiver<Option<Address>>;
}

/// Stream of address changes, starting with the current value.
pub fn address_changes(provider: &dyn IdentityProvider) -> WatchStream<Option<Address>> {
    WatchStream::new(provider.subscribe())
}
