//! Telemetry configuration.

use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable overriding the configured filter, `RUST_LOG` syntax.
pub const LOG_ENV: &str = "KC_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter directive (`info`, `kc_blocks=debug,warn`, ...).
    pub log_level: String,

    /// One JSON object per event instead of human-readable lines.
    pub json_logs: bool,

    /// Print the module path of each event.
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            with_target: true,
        }
    }
}

impl TelemetryConfig {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KC_LOG_LEVEL`: filter directive (default: info)
    /// - `KC_JSON_LOGS`: `true`/`1` for JSON output (default: false)
    /// - `KC_LOG_TARGET`: `false`/`0` hides targets (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("KC_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: env::var("KC_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.json_logs),
            with_target: env::var("KC_LOG_TARGET")
                .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
                .unwrap_or(defaults.with_target),
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}
