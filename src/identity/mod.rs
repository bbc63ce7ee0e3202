//! Caller identity.
//!
//! - `IdentityProvider` trait with an explicit address-changed subscription
//! - `ConfiguredIdentity` for the operator CLI
//! - `MockIdentity` for tests

pub mod configured;
pub mod mock;
pub mod traits;

pub use configured::ConfiguredIdentity;
pub use mock::MockIdentity;
pub use traits::{address_changes, IdentityError, IdentityProvider, IdentityResult};
