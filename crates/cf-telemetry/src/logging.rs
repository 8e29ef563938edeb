//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and one
//! `fmt` layer, plain text for development or JSON for log shippers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Build the filter for a configuration. `RUST_LOG` is only consulted
/// through [`TelemetryConfig::from_env`], after `CF_LOG_LEVEL`.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Install the global subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    let result = if !config.console_output {
        tracing_subscriber::registry().with(filter).try_init()
    } else if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    };
    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log a component lifecycle event with the standard fields.
///
/// ```rust,ignore
/// log_component_event!(debug, "[Factory] Component configured", path = %path, type_name = %t);
/// ```
#[macro_export]
macro_rules! log_component_event {
    ($level:ident, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = "component-factory",
            $($($field)*,)?
            $msg
        )
    };
}
