//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error or a full directive)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Network the runtime talks to (hardhat, localhost, sepolia, ...)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vrf-mint".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "hardhat".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MINT_SERVICE_NAME`: Service name (default: vrf-mint)
    /// - `MINT_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MINT_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `MINT_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `MINT_NETWORK`: Network name (default: hardhat)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self::from_lookup(|key| env::var(key).ok(), is_container)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, is_container: bool) -> Self {
        let defaults = Self::default();

        Self {
            service_name: lookup("MINT_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("MINT_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("MINT_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("MINT_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            network: lookup("MINT_NETWORK").unwrap_or(defaults.network),
        }
    }
}
