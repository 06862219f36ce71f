// Error types module

use std::time::Duration;

use thiserror::Error;

/// Startup errors. Any of these aborts initialization before a single
/// request can be observed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config file: {0}")]
    Io(String),

    /// YAML could not be parsed into the configuration types
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A `${VAR}` placeholder references an unset environment variable
    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    /// A configuration value violates a validation rule
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Algorithm identifier is not one of the known JWS algorithms
    #[error("Unknown algorithm '{0}': algorithm must be one of HS256, HS384, HS512, RS256, RS384, RS512, PS256, PS384, PS512, ES256, ES384, ES512, EdDSA")]
    UnknownAlgorithm(String),

    /// Algorithm is known but the signing backend cannot produce it
    #[error("Algorithm '{0}' is not supported by the signing backend")]
    UnsupportedAlgorithm(String),

    /// Timezone identifier is not a known IANA zone
    #[error("Unknown timezone '{0}'")]
    UnknownTimezone(String),

    /// Secret could not be decoded into a key for the algorithm
    #[error("Invalid key for {algorithm}: {reason}")]
    InvalidKey { algorithm: String, reason: String },

    /// Key is below the algorithm's minimum strength
    #[error("Weak key for {algorithm}: {actual} bits provided, at least {required} bits required")]
    WeakKey {
        algorithm: String,
        required: usize,
        actual: usize,
    },

    /// Key material could not be generated
    #[error("Failed to generate key for {algorithm}: {reason}")]
    KeyGeneration { algorithm: String, reason: String },

    /// The sign/verify self-test with the derived key failed
    #[error("Key validation failed: {0}")]
    KeyValidation(String),
}

/// Request-scoped token failures. The request filter downgrades all of
/// them to "unauthenticated" without telling the caller which one occurred.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token string is empty or only whitespace
    #[error("Token must not be blank")]
    InvalidArgument,

    /// Token is not a well-formed compact JWS or lacks required claims
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Signature did not verify with the configured key
    #[error("Token signature verification failed")]
    BadSignature,

    /// Token expiration lies before the current time
    #[error("Token expired at {expired_at} (now {now})")]
    Expired { expired_at: i64, now: i64 },

    /// Signing backend failed to produce a token
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Failure of the pluggable credential check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthenticatorError {
    #[error("Bad credentials")]
    BadCredentials,

    #[error("Authenticator unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the external revocation store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RevocationError {
    #[error("Revocation store error: {0}")]
    Store(String),

    #[error("Revocation store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Login failures. None of them returns a token to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Invalid login request: {0}")]
    InvalidRequest(String),

    #[error("Bad credentials")]
    BadCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Revocation(#[from] RevocationError),
}

impl LoginError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            LoginError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            _ => http::StatusCode::UNAUTHORIZED,
        }
    }
}
