//! Coordinator configuration with validation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Wait used when the caller passes no timeout (default: 5 minutes,
    /// how long an oracle round trip is given on a live network)
    pub default_timeout_ms: u64,
    /// Completion events a listener holds while its action is still in flight
    pub early_event_capacity: usize,
    /// How long resolved request ids are remembered for stray classification
    pub resolved_ttl_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 300_000,
            early_event_capacity: 256,
            resolved_ttl_secs: 300,
        }
    }
}

impl CoordinatorConfig {
    /// Create configuration from environment variables.
    ///
    /// - `MINT_FULFILLMENT_TIMEOUT_MS`: default wait (default: 300000)
    /// - `MINT_EARLY_EVENT_CAPACITY`: held events per listener (default: 256)
    /// - `MINT_RESOLVED_TTL_SECS`: resolved-id retention (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_timeout_ms: env_parse("MINT_FULFILLMENT_TIMEOUT_MS")
                .unwrap_or(defaults.default_timeout_ms),
            early_event_capacity: env_parse("MINT_EARLY_EVENT_CAPACITY")
                .unwrap_or(defaults.early_event_capacity),
            resolved_ttl_secs: env_parse("MINT_RESOLVED_TTL_SECS")
                .unwrap_or(defaults.resolved_ttl_secs),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "default_timeout_ms cannot be 0".into(),
            ));
        }

        if self.early_event_capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "early_event_capacity cannot be 0".into(),
            ));
        }

        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn resolved_ttl(&self) -> Duration {
        Duration::from_secs(self.resolved_ttl_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
