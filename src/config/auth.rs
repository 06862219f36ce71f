//! Authentication configuration types.
//!
//! This module defines the settings consumed at startup by the token codec,
//! the request filter and the login flow:
//! - Signature algorithm and optional secret (generated when absent)
//! - Token time-to-live and the timezone used to read the clock
//! - Login endpoint and additional unsecured path patterns
//! - Default claims extractors toggle
//! - Revocation store timeout
//! - Optional static users for the in-memory authenticator
//!
//! Everything here is read once; nothing is reloaded at runtime.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ENDPOINT, DEFAULT_REVOCATION_TIMEOUT_MS, DEFAULT_TTL_SECONDS};

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

fn default_revocation_timeout_ms() -> u64 {
    DEFAULT_REVOCATION_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// Token authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    /// Login endpoint path, never subject to token processing.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Additional path patterns that bypass token processing (Ant-style globs).
    #[serde(default)]
    pub unsecured_paths: Vec<String>,
    /// Token lifetime in seconds (default: 3600).
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Signing secret.
    ///
    /// For HMAC algorithms this is the raw secret; for RSA, ECDSA and EdDSA it
    /// is a PKCS#8 PEM private key. When absent a key is generated at startup
    /// and kept only in memory, so tokens do not survive a restart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// IANA timezone used to interpret the clock (default: system zone).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// JWS algorithm identifier (default: HS256).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Register the authorities and account-flags extractors.
    #[serde(default = "default_true")]
    pub enable_default_extractors: bool,
    /// Upper bound for each revocation store call in milliseconds.
    #[serde(default = "default_revocation_timeout_ms")]
    pub revocation_timeout_ms: u64,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            endpoint: default_endpoint(),
            unsecured_paths: Vec::new(),
            ttl_seconds: default_ttl_seconds(),
            secret: None,
            timezone: None,
            algorithm: None,
            enable_default_extractors: true,
            revocation_timeout_ms: default_revocation_timeout_ms(),
            users: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// All unsecured patterns: the login endpoint followed by `unsecured_paths`.
    pub fn all_unsecured_paths(&self) -> Vec<String> {
        std::iter::once(self.endpoint.clone())
            .chain(self.unsecured_paths.iter().cloned())
            .collect()
    }
}

/// A user known to the in-memory authenticator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserConfig {
    pub username: String,
    /// Argon2 PHC string, as produced by `kagi hash-password`
    pub password_hash: String,
    #[serde(default)]
    pub authorities: Vec<String>,
    #[serde(default)]
    pub account_expired: bool,
    #[serde(default)]
    pub account_locked: bool,
    #[serde(default)]
    pub credentials_expired: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}
