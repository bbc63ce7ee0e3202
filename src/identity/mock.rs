//! Switchable identity provider for tests.

use super::traits::*;
use crate::model::Address;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Mock identity provider whose address can be changed at runtime.
#[derive(Clone)]
pub struct MockIdentity {
    inner: Arc<MockInner>,
}

struct MockInner {
    address: watch::Sender<Option<Address>>,
    grant: Mutex<Option<Address>>,
}

impl MockIdentity {
    /// Provider with no bound address.
    pub fn disconnected() -> Self {
        let (address, _) = watch::channel(None);
        Self {
            inner: Arc::new(MockInner {
                address,
                grant: Mutex::new(None),
            }),
        }
    }

    /// Provider already bound to `address`.
    pub fn bound(address: &str) -> Self {
        let identity = Self::disconnected();
        identity.set_address(Some(Address::new(address)));
        identity
    }

    /// Change (or clear) the bound address, notifying subscribers.
    pub fn set_address(&self, address: Option<Address>) {
        self.inner.address.send_replace(address);
    }

    /// Address handed out by the next `request_address` when none is bound.
    pub fn grant_on_request(&self, address: &str) {
        *self.inner.grant.lock().unwrap() = Some(Address::new(address));
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    fn current_address(&self) -> Option<Address> {
        self.inner.address.borrow().clone()
    }

    async fn request_address(&self) -> IdentityResult<Address> {
        if let Some(address) = self.current_address() {
            return Ok(address);
        }
        let granted = self.inner.grant.lock().unwrap().take();
        match granted {
            Some(address) => {
                self.set_address(Some(address.clone()));
                Ok(address)
            }
            None => Err(IdentityError::Rejected("request declined".to_string())),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<Address>> {
        self.inner.address.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_bound_identity() {
        let identity = MockIdentity::bound("0xabc");
        assert_eq!(identity.current_address(), Some(Address::new("0xabc")));
        assert_eq!(
            identity.request_address().await.unwrap(),
            Address::new("0xabc")
        );
    }

    #[tokio::test]
    async fn test_request_without_grant_is_rejected() {
        let identity = MockIdentity::disconnected();
        let result = identity.request_address().await;
        assert!(matches!(result, Err(IdentityError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_request_with_grant_binds_address() {
        let identity = MockIdentity::disconnected();
        identity.grant_on_request("0xdef");
        let address = identity.request_address().await.unwrap();
        assert_eq!(address, Address::new("0xdef"));
        assert_eq!(identity.current_address(), Some(address));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let identity = MockIdentity::bound("0xabc");
        let mut changes = address_changes(&identity);

        assert_eq!(changes.next().await, Some(Some(Address::new("0xabc"))));

        identity.set_address(None);
        assert_eq!(changes.next().await, Some(None));
    }
}
