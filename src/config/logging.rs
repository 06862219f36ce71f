//! Logging configuration types.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOG_LEVEL;

fn default_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Logging subscriber settings. `RUST_LOG`, when set, takes precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `kagi=debug,info`
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
            json: false,
        }
    }
}
