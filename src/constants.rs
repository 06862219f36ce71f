// Constants module - centralized default values for configuration
//
// This module defines the default values used throughout the codebase.

// =============================================================================
// Authentication defaults
// =============================================================================

/// Default path of the login endpoint (always unsecured)
pub const DEFAULT_ENDPOINT: &str = "/authenticate";

/// Default token time-to-live in seconds
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Default signature algorithm when none is configured
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Default upper bound for a single revocation store call in milliseconds
pub const DEFAULT_REVOCATION_TIMEOUT_MS: u64 = 500;

/// Header carrying the bearer token
pub const AUTHORIZATION_HEADER: &str = "Authorization";

// =============================================================================
// Key defaults
// =============================================================================

/// Size of generated RSA keys in bits (also the accepted minimum)
pub const RSA_KEY_BITS: usize = 2048;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level when neither RUST_LOG nor the config sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
