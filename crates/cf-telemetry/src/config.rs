//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to print logs to the console at all
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether factory metrics are registered
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "component-forge".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CF_SERVICE_NAME`: Service name (default: component-forge)
    /// - `CF_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CF_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CF_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `CF_METRICS_ENABLED`: Register Prometheus metrics (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup("CF_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("CF_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("CF_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("CF_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            metrics_enabled: lookup("CF_METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Configuration for tests: quiet, plain text.
    pub fn for_tests() -> Self {
        Self {
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }
}
