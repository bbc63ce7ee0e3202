//! Ledgerfeed configuration file handling
//!
//! Configuration is a TOML file, by default at
//! `<config_dir>/ledgerfeed/config.toml`. Only the ledger and store endpoints
//! are required; every other setting has a default.

use crate::identity::ConfiguredIdentity;
use crate::ledger::{HttpLedgerTransport, LedgerClientConfig};
use crate::model::Address;
use crate::retry::RetryPolicy;
use crate::scorer::{ChatCompletionBackend, HttpScoringBackend, ScoringBackend};
use crate::service::{Backends, NewsroomSettings};
use crate::store::HttpContentStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerfeedConfig {
    /// Bound author identity
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Ledger gateway
    pub ledger: LedgerConfig,

    /// Content store
    pub store: StoreConfig,

    /// Credibility scorer
    #[serde(default)]
    pub scorer: ScorerConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    /// Caller-side retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentityConfig {
    /// Author address; absent means no identity is bound and submissions fail
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub endpoint: String,

    #[serde(default = "default_ledger_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How long a commit may wait for finalization before it counts as rejected
    #[serde(default = "default_finalization_timeout_ms")]
    pub finalization_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub endpoint: String,

    #[serde(default = "default_store_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Public gateway used for display links (optional)
    pub gateway: Option<String>,
}

/// Which scoring protocol the endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    /// POST `{title, body}`, reply is the bare number
    #[default]
    Plain,
    /// Chat-completions API
    Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    #[serde(default)]
    pub kind: ScorerKind,

    #[serde(default = "default_scorer_endpoint")]
    pub endpoint: String,

    /// Environment variable holding the API key (optional)
    pub api_key_env: Option<String>,

    #[serde(default = "default_scorer_model")]
    pub model: String,

    #[serde(default = "default_scorer_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum concurrent content fetches while building the feed
    #[serde(default = "default_fanout_limit")]
    pub fanout_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_ledger_request_timeout_ms() -> u64 {
    10_000
}

fn default_finalization_timeout_ms() -> u64 {
    120_000
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_store_request_timeout_ms() -> u64 {
    15_000
}

fn default_scorer_endpoint() -> String {
    "http://127.0.0.1:3000/api/score".to_string()
}

fn default_scorer_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_scorer_timeout_ms() -> u64 {
    20_000
}

fn default_fanout_limit() -> usize {
    crate::fanout::DEFAULT_FANOUT_LIMIT
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8_000
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::default(),
            endpoint: default_scorer_endpoint(),
            api_key_env: None,
            model: default_scorer_model(),
            timeout_ms: default_scorer_timeout_ms(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            fanout_limit: default_fanout_limit(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LedgerfeedConfig {
    /// Configuration pointing at the given endpoints, defaults elsewhere
    pub fn new(ledger_endpoint: impl Into<String>, store_endpoint: impl Into<String>) -> Self {
        Self {
            identity: IdentityConfig::default(),
            ledger: LedgerConfig {
                endpoint: ledger_endpoint.into(),
                request_timeout_ms: default_ledger_request_timeout_ms(),
                finalization_timeout_ms: default_finalization_timeout_ms(),
                poll_interval_ms: default_poll_interval_ms(),
            },
            store: StoreConfig {
                endpoint: store_endpoint.into(),
                request_timeout_ms: default_store_request_timeout_ms(),
                gateway: None,
            },
            scorer: ScorerConfig::default(),
            feed: FeedConfig::default(),
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: LedgerfeedConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        config
            .validate()
            .map_err(|e| format!("Invalid config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.feed.fanout_limit == 0 {
            return Err("feed.fanout_limit must be at least 1".to_string());
        }
        for (field, value) in [
            ("ledger.request_timeout_ms", self.ledger.request_timeout_ms),
            ("ledger.finalization_timeout_ms", self.ledger.finalization_timeout_ms),
            ("ledger.poll_interval_ms", self.ledger.poll_interval_ms),
            ("store.request_timeout_ms", self.store.request_timeout_ms),
            ("scorer.timeout_ms", self.scorer.timeout_ms),
        ] {
            if value == 0 {
                return Err(format!("{} must be greater than 0", field));
            }
        }
        parse_endpoint("ledger.endpoint", &self.ledger.endpoint)?;
        parse_endpoint("store.endpoint", &self.store.endpoint)?;
        parse_endpoint("scorer.endpoint", &self.scorer.endpoint)?;
        if let Some(gateway) = &self.store.gateway {
            parse_endpoint("store.gateway", gateway)?;
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err("retry.base_delay_ms exceeds retry.max_delay_ms".to_string());
        }
        Ok(())
    }

    /// Timeouts, limits and retry policy for the newsroom
    pub fn settings(&self) -> NewsroomSettings {
        NewsroomSettings {
            ledger: LedgerClientConfig {
                request_timeout: Duration::from_millis(self.ledger.request_timeout_ms),
                finalization_timeout: Duration::from_millis(self.ledger.finalization_timeout_ms),
                poll_interval: Duration::from_millis(self.ledger.poll_interval_ms),
                fanout_limit: self.feed.fanout_limit,
            },
            store_timeout: Duration::from_millis(self.store.request_timeout_ms),
            scorer_timeout: Duration::from_millis(self.scorer.timeout_ms),
            retry: RetryPolicy {
                max_retries: self.retry.max_retries,
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                max_delay: Duration::from_millis(self.retry.max_delay_ms),
            },
        }
    }

    /// HTTP backends and the configured identity
    pub fn backends(&self) -> Result<Backends, Box<dyn std::error::Error>> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ledgerfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        let ledger = HttpLedgerTransport::new(
            client.clone(),
            parse_endpoint("ledger.endpoint", &self.ledger.endpoint)?,
        );
        let store = HttpContentStore::new(
            client.clone(),
            parse_endpoint("store.endpoint", &self.store.endpoint)?,
        );

        let scorer_endpoint = parse_endpoint("scorer.endpoint", &self.scorer.endpoint)?;
        let api_key = self
            .scorer
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok());
        let scorer: Arc<dyn ScoringBackend> = match self.scorer.kind {
            ScorerKind::Plain => Arc::new(HttpScoringBackend::new(client, scorer_endpoint, api_key)),
            ScorerKind::Chat => Arc::new(ChatCompletionBackend::new(
                client,
                scorer_endpoint,
                api_key,
                self.scorer.model.clone(),
            )),
        };

        let address = self.identity.address.as_deref().map(Address::new);

        Ok(Backends {
            identity: Arc::new(ConfiguredIdentity::new(address)),
            ledger: Arc::new(ledger),
            store: Arc::new(store),
            scorer,
        })
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml() -> String {
        r#"# Ledgerfeed configuration

[identity]
# Author address submissions are attributed to.
# Leave commented to browse without an identity (submissions will fail).
# address = "0x..."

[ledger]
# Ledger gateway base URL
endpoint = "http://127.0.0.1:8545/ledger"
request_timeout_ms = 10000
# A commit not finalized within this window is reported as rejected
finalization_timeout_ms = 120000
poll_interval_ms = 1000

[store]
# Content store base URL
endpoint = "http://127.0.0.1:3000/api/ipfs"
request_timeout_ms = 15000
# Public gateway for display links (optional)
# gateway = "https://ipfs.io/ipfs"

[scorer]
# "plain" (POST {title, body}, bare number reply) or "chat" (chat completions)
kind = "plain"
endpoint = "http://127.0.0.1:3000/api/score"
# Environment variable holding the API key (optional)
# api_key_env = "LEDGERFEED_SCORER_KEY"
model = "gpt-4o-mini"
timeout_ms = 20000

[feed]
# Maximum concurrent content fetches
fanout_limit = 16

[retry]
max_retries = 3
base_delay_ms = 500
max_delay_ms = 8000

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "info"
"#
        .to_string()
    }

    /// Create and save a default configuration file
    pub fn create_default(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, Self::generate_default_toml()).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

fn parse_endpoint(field: &str, value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|e| format!("{} is not a valid URL ({}): {}", field, value, e))
}

/// Get the default config file path
///
/// - Linux: ~/.config/ledgerfeed/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ledgerfeed")
        .join("config.toml")
}
