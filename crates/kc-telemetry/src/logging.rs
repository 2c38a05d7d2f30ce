//! Subscriber installation.

use crate::config::{TelemetryConfig, LOG_ENV};
use crate::TelemetryError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// The filter `init_logging` installs: `env` when set, else the configured level.
pub fn build_filter(config: &TelemetryConfig, env: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    let directive = env.unwrap_or(&config.log_level);
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::Filter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber.
///
/// Fails instead of panicking when a subscriber is already installed, so
/// tests and benches may call it freely.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(config, env.as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_target(config.with_target))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(config.with_target))
            .try_init()
    };
    result.map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(
        level = %config.log_level,
        json = config.json_logs,
        "logging initialised"
    );
    Ok(())
}
