//! Identity bound from operator configuration.

use super::traits::*;
use crate::model::Address;
use async_trait::async_trait;
use tokio::sync::watch;

/// Fixed identity read from config. There is nobody to prompt, so
/// `request_address` only succeeds when an address was configured.
pub struct ConfiguredIdentity {
    address: watch::Sender<Option<Address>>,
}

impl ConfiguredIdentity {
    pub fn new(address: Option<Address>) -> Self {
        let (sender, _) = watch::channel(address);
        Self { address: sender }
    }
}

#[async_trait]
impl IdentityProvider for ConfiguredIdentity {
    fn current_address(&self) -> Option<Address> {
        self.address.borrow().clone()
    }

    async fn request_address(&self) -> IdentityResult<Address> {
        self.current_address().ok_or(IdentityError::Unavailable)
    }

    fn subscribe(&self) -> watch::Receiver<Option<Address>> {
        self.address.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_identity_is_unavailable() {
        let identity = ConfiguredIdentity::new(None);
        assert_eq!(identity.current_address(), None);
        assert_eq!(
            identity.request_address().await,
            Err(IdentityError::Unavailable)
        );
    }

    #[tokio::test]
    async fn test_configured_identity() {
        let identity = ConfiguredIdentity::new(Some(Address::new("0xabc")));
        assert_eq!(
            identity.request_address().await,
            Ok(Address::new("0xabc"))
        );
        assert_eq!(*identity.subscribe().borrow(), Some(Address::new("0xabc")));
    }
}
