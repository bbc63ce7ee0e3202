//! Ledgerfeed - ledger-indexed news submission and verification
//!
//! Authors submit articles; each is scored for credibility, stored in a
//! content-addressed store, and indexed on an append-only ledger. Readers get
//! a newest-first feed joining the ledger index with stored content.
//!
//! Key principles:
//! - The ledger is authoritative for title, author and timestamp
//! - Content is stored before it is indexed; orphans are never visible
//! - Scoring is an enrichment, never a blocker
//! - One unreadable item never fails the feed

pub mod config;
pub mod fanout;
pub mod identity;
pub mod ledger;
pub mod model;
pub mod pipeline;
pub mod retry;
pub mod scorer;
pub mod service;
pub mod store;

pub use service::{Backends, Newsroom, NewsroomSettings};
