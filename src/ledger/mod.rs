//! Append-only ledger index.
//!
//! - `LedgerTransport` trait over the wire contract, with HTTP and mock backends
//! - `LedgerClient` adds identity attribution, finalization waits, timeouts,
//!   ordered concurrent enumeration and a polling watch for new records

pub mod client;
pub mod http;
pub mod mock;
pub mod traits;

pub use client::{CommitReceipt, LedgerClient, LedgerClientConfig};
pub use http::HttpLedgerTransport;
pub use mock::MockLedger;
pub use traits::{Finalization, LedgerError, LedgerResult, LedgerTransport, PendingWrite};
