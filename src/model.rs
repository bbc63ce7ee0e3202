//! Core data model shared by the write and read paths.
//!
//! - `IndexRecord`: what the ledger holds, immutable once committed
//! - `ContentPayload`: what the content store holds, addressed by its bytes
//! - `FeedEntry`: the read-side join of the two, built per feed request
//!
//! The degradation rule for a record whose content cannot be resolved lives in
//! exactly one place: [`FeedEntry::degraded`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Score assigned when no real credibility estimate is available.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Milliseconds since the Unix epoch.
pub type Millis = u64;

/// Current wall-clock time in milliseconds.
pub fn now_millis() -> Millis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Millis)
        .unwrap_or(0)
}

/// Pseudonymous author address supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for display: first 6 and last 4 characters.
    pub fn truncated(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content store reference, as returned by the store (`scheme://key[/path]`).
///
/// Two references are the same content when their normalized [`key`](Self::key)s
/// match; the raw form is kept because it is what the ledger records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Raw reference exactly as stored on the ledger.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalized key: scheme prefix and trailing path segments removed.
    ///
    /// `ipfs://bafy123/0` and `bafy123` both normalize to `bafy123`.
    pub fn key(&self) -> &str {
        let without_scheme = match self.0.find("://") {
            Some(pos) => &self.0[pos + 3..],
            None => self.0.as_str(),
        };
        let trimmed = without_scheme.trim_start_matches('/');
        trimmed.split('/').next().unwrap_or(trimmed)
    }

    /// True when both references resolve to the same normalized key.
    pub fn same_content(&self, other: &ContentRef) -> bool {
        self.key() == other.key()
    }

    /// Public gateway link for the referenced content.
    pub fn gateway_url(&self, gateway: &str) -> String {
        format!("{}/{}", gateway.trim_end_matches('/'), self.key())
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A credibility estimate known to be a finite value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct CredibilityScore(f64);

impl CredibilityScore {
    /// Validate a raw score. Non-finite or out-of-range values are rejected.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn neutral() -> Self {
        Self(NEUTRAL_SCORE)
    }

    /// Validate, falling back to neutral.
    pub fn or_neutral(value: f64) -> Self {
        Self::new(value).unwrap_or_else(Self::neutral)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whole-percent display, e.g. `"90%"`.
    pub fn percent(self) -> String {
        format!("{:.0}%", self.0 * 100.0)
    }

    pub fn verdict(self) -> Verdict {
        Verdict::from_score(self)
    }

    pub fn level(self) -> VerificationLevel {
        VerificationLevel::from_score(self)
    }
}

impl Default for CredibilityScore {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for CredibilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Reader-facing verdict for a feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    LikelyTrue,
    Unverified,
    LikelyFalse,
}

impl Verdict {
    /// Scores at or above this are treated as verified.
    pub const VERIFIED_THRESHOLD: f64 = 0.8;

    pub fn from_score(score: CredibilityScore) -> Self {
        let s = score.value();
        if s >= Self::VERIFIED_THRESHOLD {
            Verdict::LikelyTrue
        } else if s >= NEUTRAL_SCORE {
            Verdict::Unverified
        } else {
            Verdict::LikelyFalse
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::LikelyTrue => write!(f, "Likely True"),
            Verdict::Unverified => write!(f, "Unverified"),
            Verdict::LikelyFalse => write!(f, "Likely False"),
        }
    }
}

/// Coarse badge level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationLevel {
    High,
    Medium,
    Low,
}

impl VerificationLevel {
    pub fn from_score(score: CredibilityScore) -> Self {
        let s = score.value();
        if s >= 0.7 {
            VerificationLevel::High
        } else if s >= 0.4 {
            VerificationLevel::Medium
        } else {
            VerificationLevel::Low
        }
    }
}

/// Ledger index record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRecord {
    pub content_ref: ContentRef,
    pub title: String,
    pub timestamp: Millis,
    pub author: Address,
    /// Dense, zero-based position assigned by the ledger at commit.
    pub sequence_index: u64,
}

/// Content payload as stored in (and addressed by) the content store.
///
/// Field names on the wire follow the store's JSON document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    pub author: Address,
    pub timestamp: Millis,
    #[serde(rename = "verificationScore")]
    pub credibility_score: f64,
}

impl ContentPayload {
    /// Serialized bytes; the content address is derived from these.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Whether a feed entry carries its stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    Degraded,
}

/// One entry of the aggregated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub content_ref: ContentRef,
    pub title: String,
    pub body: String,
    pub author: Address,
    pub timestamp: Millis,
    pub sequence_index: u64,
    pub credibility_score: CredibilityScore,
    pub resolution: Resolution,
}

impl FeedEntry {
    /// Join a record with its resolved payload.
    ///
    /// The ledger is authoritative for title, author and timestamp; the payload
    /// contributes body and score. An invalid stored score reads as neutral.
    pub fn resolved(record: IndexRecord, payload: ContentPayload) -> Self {
        Self {
            content_ref: record.content_ref,
            title: record.title,
            body: payload.body,
            author: record.author,
            timestamp: record.timestamp,
            sequence_index: record.sequence_index,
            credibility_score: CredibilityScore::or_neutral(payload.credibility_score),
            resolution: Resolution::Resolved,
        }
    }

    /// What a record looks like when its content could not be fetched.
    pub fn degraded(record: IndexRecord) -> Self {
        Self {
            content_ref: record.content_ref,
            title: record.title,
            body: String::new(),
            author: record.author,
            timestamp: record.timestamp,
            sequence_index: record.sequence_index,
            credibility_score: CredibilityScore::neutral(),
            resolution: Resolution::Degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.resolution == Resolution::Degraded
    }

    /// Canonical feed order: newest timestamp first, later commits first on ties.
    pub fn feed_order(a: &FeedEntry, b: &FeedEntry) -> Ordering {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.sequence_index.cmp(&a.sequence_index))
    }
}
