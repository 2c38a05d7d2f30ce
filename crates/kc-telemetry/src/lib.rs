//! # Klay-Core Telemetry
//!
//! Structured logging for the workspace. Library crates only emit `tracing`
//! events; whoever owns the process installs the subscriber once:
//!
//! ```rust,ignore
//! use kc_telemetry::{init_logging, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! ```
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KC_LOG` | unset | Filter override, wins over the config |
//! | `KC_LOG_LEVEL` | `info` | Configured filter |
//! | `KC_JSON_LOGS` | `false` | JSON output |
//! | `KC_LOG_TARGET` | `true` | Print event targets |

mod config;
mod logging;

pub use config::{TelemetryConfig, LOG_ENV};
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("invalid log filter {directive:?}: {reason}")]
    Filter { directive: String, reason: String },

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}
