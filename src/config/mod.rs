// Configuration module

use argon2::PasswordHash;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::token::algorithm::SignatureAlgorithm;

pub mod auth;
pub mod logging;

pub use auth::{AuthConfig, UserConfig};
pub use logging::LoggingConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut missing = None;
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing {
            return Err(ConfigError::MissingEnvVar(var_name));
        }

        serde_yaml::from_str(&substituted).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let auth = &self.auth;

        if !auth.endpoint.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "endpoint '{}' does not start with /",
                auth.endpoint
            )));
        }

        for pattern in &auth.unsecured_paths {
            if !pattern.starts_with('/') && !pattern.starts_with("**") {
                return Err(ConfigError::Invalid(format!(
                    "unsecured path '{}' must start with / or **",
                    pattern
                )));
            }
        }

        if auth.ttl_seconds == 0 {
            return Err(ConfigError::Invalid(
                "ttl_seconds must be greater than 0".to_string(),
            ));
        }

        if auth.revocation_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "revocation_timeout_ms must be greater than 0".to_string(),
            ));
        }

        // Blank algorithm falls back to the default at startup
        if let Some(algorithm) = auth.algorithm.as_deref().filter(|a| !a.trim().is_empty()) {
            SignatureAlgorithm::from_str(algorithm)?;
        }

        if let Some(timezone) = auth.timezone.as_deref().filter(|t| !t.trim().is_empty()) {
            chrono_tz::Tz::from_str(timezone.trim())
                .map_err(|_| ConfigError::UnknownTimezone(timezone.to_string()))?;
        }

        let mut seen_users = HashSet::new();
        for user in &auth.users {
            if user.username.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "user name cannot be empty".to_string(),
                ));
            }

            if !seen_users.insert(&user.username) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate user '{}'",
                    user.username
                )));
            }

            if PasswordHash::new(&user.password_hash).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "user '{}' has a password_hash that is not a PHC string",
                    user.username
                )));
            }
        }

        Ok(())
    }
}
