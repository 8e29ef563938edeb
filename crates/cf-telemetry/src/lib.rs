//! # CF Telemetry
//!
//! Logging and metrics for Component Forge.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, text or JSON
//! - **Metrics**: Prometheus counters, gauges and histograms for the factory,
//!   the type registry and the resource broker
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cf_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//!     // Logs and metrics are now being collected
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CF_SERVICE_NAME` | `component-forge` | Service name in logs |
//! | `CF_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CF_CONSOLE_OUTPUT` | `true` | Print logs to the console |
//! | `CF_JSON_LOGS` | `false` | JSON formatted logs |
//! | `CF_METRICS_ENABLED` | `true` | Register Prometheus metrics |

#![cfg_attr(test, allow(clippy::unwrap_used))]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, COMPONENTS_CONFIGURED, COMPONENTS_CREATED,
    COMPONENTS_DESTROYED, CYCLIC_DEPENDENCIES, LIVE_COMPONENTS, RESOLVE_DURATION,
    RESOURCE_NOTIFICATIONS, TYPES_REGISTERED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and, when enabled, metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if config.metrics_enabled {
        register_metrics()?;
    }
    init_logging(config)
}
