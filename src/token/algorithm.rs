//! JWS signature algorithm identifiers.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

/// Key family an algorithm signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    EcP256,
    EcP384,
    EcP521,
    Ed25519,
}

/// Every algorithm identifier accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    PS256,
    PS384,
    PS512,
    ES256,
    ES384,
    ES512,
    EdDSA,
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 13] = [
        SignatureAlgorithm::HS256,
        SignatureAlgorithm::HS384,
        SignatureAlgorithm::HS512,
        SignatureAlgorithm::RS256,
        SignatureAlgorithm::RS384,
        SignatureAlgorithm::RS512,
        SignatureAlgorithm::PS256,
        SignatureAlgorithm::PS384,
        SignatureAlgorithm::PS512,
        SignatureAlgorithm::ES256,
        SignatureAlgorithm::ES384,
        SignatureAlgorithm::ES512,
        SignatureAlgorithm::EdDSA,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SignatureAlgorithm::HS256 => "HS256",
            SignatureAlgorithm::HS384 => "HS384",
            SignatureAlgorithm::HS512 => "HS512",
            SignatureAlgorithm::RS256 => "RS256",
            SignatureAlgorithm::RS384 => "RS384",
            SignatureAlgorithm::RS512 => "RS512",
            SignatureAlgorithm::PS256 => "PS256",
            SignatureAlgorithm::PS384 => "PS384",
            SignatureAlgorithm::PS512 => "PS512",
            SignatureAlgorithm::ES256 => "ES256",
            SignatureAlgorithm::ES384 => "ES384",
            SignatureAlgorithm::ES512 => "ES512",
            SignatureAlgorithm::EdDSA => "EdDSA",
        }
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            SignatureAlgorithm::HS256 | SignatureAlgorithm::HS384 | SignatureAlgorithm::HS512 => {
                KeyFamily::Hmac
            }
            SignatureAlgorithm::RS256
            | SignatureAlgorithm::RS384
            | SignatureAlgorithm::RS512
            | SignatureAlgorithm::PS256
            | SignatureAlgorithm::PS384
            | SignatureAlgorithm::PS512 => KeyFamily::Rsa,
            SignatureAlgorithm::ES256 => KeyFamily::EcP256,
            SignatureAlgorithm::ES384 => KeyFamily::EcP384,
            SignatureAlgorithm::ES512 => KeyFamily::EcP521,
            SignatureAlgorithm::EdDSA => KeyFamily::Ed25519,
        }
    }

    /// Minimum HMAC secret length in bytes (RFC 7518 §3.2: key size >= hash output).
    pub fn min_hmac_key_bytes(&self) -> Option<usize> {
        match self {
            SignatureAlgorithm::HS256 => Some(32),
            SignatureAlgorithm::HS384 => Some(48),
            SignatureAlgorithm::HS512 => Some(64),
            _ => None,
        }
    }

    /// The signing backend's algorithm, if it implements this one.
    pub fn to_jwt_algorithm(&self) -> Result<Algorithm, ConfigError> {
        Ok(match self {
            SignatureAlgorithm::HS256 => Algorithm::HS256,
            SignatureAlgorithm::HS384 => Algorithm::HS384,
            SignatureAlgorithm::HS512 => Algorithm::HS512,
            SignatureAlgorithm::RS256 => Algorithm::RS256,
            SignatureAlgorithm::RS384 => Algorithm::RS384,
            SignatureAlgorithm::RS512 => Algorithm::RS512,
            SignatureAlgorithm::PS256 => Algorithm::PS256,
            SignatureAlgorithm::PS384 => Algorithm::PS384,
            SignatureAlgorithm::PS512 => Algorithm::PS512,
            SignatureAlgorithm::ES256 => Algorithm::ES256,
            SignatureAlgorithm::ES384 => Algorithm::ES384,
            SignatureAlgorithm::EdDSA => Algorithm::EdDSA,
            SignatureAlgorithm::ES512 => {
                return Err(ConfigError::UnsupportedAlgorithm(self.id().to_string()))
            }
        })
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = ConfigError;

    /// Identifiers are case-sensitive, as in the JWS registry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Self::ALL
            .into_iter()
            .find(|alg| alg.id() == id)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(s.to_string()))
    }
}
