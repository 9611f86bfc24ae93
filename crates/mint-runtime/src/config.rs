//! # Runtime Configuration
//!
//! Everything the mint flow needs, read from `MINT_*` environment variables.
//! Unparsable values fall back to their defaults with a warning.

use fulfillment_coordinator::CoordinatorConfig;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Networks on which the runtime drives the randomness oracle itself.
pub const DEVELOPMENT_CHAINS: [&str; 2] = ["hardhat", "localhost"];

/// Default wait for the oracle callback (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default mint fee: 0.01 ETH in wei.
pub const DEFAULT_MINT_FEE_WEI: u128 = 10_000_000_000_000_000;

pub const DEFAULT_BASIC_TOKEN_URI: &str =
    "ipfs://bafybeig37ioir76s7mg5oobetncojcm3c3hxasyd4rvid4jqhy4gkaheg4/?filename=0-PUG.json";

pub const DEFAULT_RANDOM_TOKEN_URIS: [&str; 3] = [
    "ipfs://QmaVkBn2tKmjbhphU7eyztbvSQU5EXDdqRyXZtRhSGgJGo",
    "ipfs://QmYQC5aGZu2PTH8XzbJrbDnvhj3gVs7ya33H9mqUNvST3d",
    "ipfs://QmZYmH5iDbD6v3U2ixoVAjioSzvWJszDzYdbeCLquGSpVm",
];

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Network name.
    pub network: String,
    /// Account that sends transactions.
    pub deployer: String,
    /// How long the flow waits for the random NFT to be minted.
    pub timeout_secs: u64,
    /// Delay before the development oracle answers a request.
    pub fulfill_delay_ms: u64,
    /// Fee the random NFT contract charges.
    pub mint_fee_wei: u128,
    /// Token URI of every basic NFT.
    pub basic_token_uri: String,
    /// URIs the development oracle hands out, in rotation.
    pub random_token_uris: Vec<String>,
    /// Coordinator tuning.
    pub coordinator: CoordinatorConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: "hardhat".to_string(),
            deployer: "deployer".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            fulfill_delay_ms: 50,
            mint_fee_wei: DEFAULT_MINT_FEE_WEI,
            basic_token_uri: DEFAULT_BASIC_TOKEN_URI.to_string(),
            random_token_uris: DEFAULT_RANDOM_TOKEN_URIS.iter().map(|s| (*s).to_string()).collect(),
            coordinator: CoordinatorConfig {
                default_timeout_ms: DEFAULT_TIMEOUT_SECS * 1000,
                ..CoordinatorConfig::default()
            },
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeConfigError {
    #[error("MINT_TIMEOUT_SECS must be greater than zero")]
    ZeroTimeout,

    #[error("at least one random token URI is required")]
    NoRandomTokenUris,

    #[error("invalid coordinator config: {0}")]
    Coordinator(#[from] fulfillment_coordinator::ConfigError),
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MINT_NETWORK`: Network name (default: hardhat)
    /// - `MINT_DEPLOYER`: Sending account (default: deployer)
    /// - `MINT_TIMEOUT_SECS`: Fulfilment wait (default: 300)
    /// - `MINT_FULFILL_DELAY_MS`: Development oracle delay (default: 50)
    /// - `MINT_FEE_WEI`: Mint fee (default: 10000000000000000)
    /// - `MINT_BASIC_TOKEN_URI`: Basic NFT token URI
    /// - `MINT_RANDOM_TOKEN_URIS`: Comma separated random NFT token URIs
    /// - `MINT_EARLY_EVENT_CAPACITY`, `MINT_RESOLVED_TTL_SECS`: Coordinator tuning
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| env::var(key).ok());
        let coordinator = CoordinatorConfig::from_env();
        config.coordinator.early_event_capacity = coordinator.early_event_capacity;
        config.coordinator.resolved_ttl_secs = coordinator.resolved_ttl_secs;
        config
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_secs = parse_or(&lookup, "MINT_TIMEOUT_SECS", defaults.timeout_secs);

        let random_token_uris = lookup("MINT_RANDOM_TOKEN_URIS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|uri| !uri.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.random_token_uris);

        Self {
            network: lookup("MINT_NETWORK").unwrap_or(defaults.network),
            deployer: lookup("MINT_DEPLOYER").unwrap_or(defaults.deployer),
            timeout_secs,
            fulfill_delay_ms: parse_or(&lookup, "MINT_FULFILL_DELAY_MS", defaults.fulfill_delay_ms),
            mint_fee_wei: parse_or(&lookup, "MINT_FEE_WEI", defaults.mint_fee_wei),
            basic_token_uri: lookup("MINT_BASIC_TOKEN_URI").unwrap_or(defaults.basic_token_uri),
            random_token_uris,
            coordinator: CoordinatorConfig {
                default_timeout_ms: timeout_secs.saturating_mul(1000),
                ..defaults.coordinator
            },
        }
    }

    /// Validate before wiring anything.
    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        if self.timeout_secs == 0 {
            return Err(RuntimeConfigError::ZeroTimeout);
        }
        if self.random_token_uris.is_empty() {
            return Err(RuntimeConfigError::NoRandomTokenUris);
        }
        self.coordinator.validate()?;
        Ok(())
    }

    /// Whether the runtime must fulfil randomness requests itself.
    pub fn is_development_chain(&self) -> bool {
        DEVELOPMENT_CHAINS.contains(&self.network.as_str())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fulfill_delay(&self) -> Duration {
        Duration::from_millis(self.fulfill_delay_ms)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Unparsable value, using default");
            default
        }),
        None => default,
    }
}
