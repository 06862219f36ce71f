//! Compact JWS signing and verification.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};

use super::algorithm::SignatureAlgorithm;
use super::claims::{Claims, EXPIRATION, ISSUED_AT, SUBJECT};
use super::clock::{Clock, TimePolicy};
use super::key::SigningKey;
use crate::config::AuthConfig;
use crate::constants::DEFAULT_ALGORITHM;
use crate::error::{ConfigError, TokenError};
use crate::logging::reveal_secret;

/// Signs claim sets into compact tokens and verifies them back.
///
/// Built once at startup by [`TokenCodec::initialize`] and shared read-only
/// afterwards.
pub struct TokenCodec {
    key: SigningKey,
    clock: Arc<dyn Clock>,
    time_policy: TimePolicy,
    ttl_seconds: i64,
    validation: Validation,
}

impl TokenCodec {
    /// Pick the algorithm, derive or generate the key and self-test it.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] returned here must abort startup.
    pub fn initialize(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let algorithm = match config
            .algorithm
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            Some(id) => SignatureAlgorithm::from_str(id)?,
            None => {
                tracing::warn!("no algorithm provided: {} will be used", DEFAULT_ALGORITHM);
                SignatureAlgorithm::from_str(DEFAULT_ALGORITHM)?
            }
        };
        let jwt_algorithm = algorithm.to_jwt_algorithm()?;

        let ttl_seconds = i64::try_from(config.ttl_seconds)
            .ok()
            .filter(|ttl| *ttl > 0)
            .ok_or_else(|| {
                ConfigError::Invalid(format!("ttl_seconds {} is out of range", config.ttl_seconds))
            })?;

        let time_policy = TimePolicy::from_config(config.timezone.as_deref())?;

        let key = match config.secret.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(secret) => {
                tracing::info!("secret provided: {} will be used", reveal_secret(secret));
                SigningKey::from_secret(algorithm, secret)?
            }
            None => {
                let (key, generated) = SigningKey::generate(algorithm)?;
                tracing::warn!(
                    "no secret provided: {} (generated with algorithm {}) will be used",
                    reveal_secret(&generated),
                    algorithm
                );
                tracing::warn!(
                    "generated secrets live only in memory: tokens issued now will not verify after a restart"
                );
                key
            }
        };

        tracing::info!("validating key strength");
        key.self_test()?;

        let mut validation = Validation::new(jwt_algorithm);
        // Expiry is checked against the configured clock, not the system time
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        tracing::info!(
            algorithm = %algorithm,
            ttl_seconds,
            timezone = %time_policy,
            "token codec initialized"
        );

        Ok(TokenCodec {
            key,
            clock,
            time_policy,
            ttl_seconds,
            validation,
        })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.key.algorithm()
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn time_policy(&self) -> TimePolicy {
        self.time_policy
    }

    /// Current instant: the clock reading resolved in the configured zone.
    pub fn now(&self) -> DateTime<Utc> {
        self.time_policy.resolve(self.clock.now())
    }

    /// Sign `claims` for `subject`, stamping `iat = now` and `exp = now + ttl`.
    ///
    /// Reserved keys are written after the chain's keys and replace any
    /// value a chain extractor put under the same name.
    pub fn sign(&self, claims: &Claims, subject: &str) -> Result<String, TokenError> {
        let issued_at = self.now().timestamp();

        let mut payload = claims.clone();
        payload.insert(SUBJECT, subject);
        payload.insert(ISSUED_AT, issued_at);
        payload.insert(EXPIRATION, issued_at.saturating_add(self.ttl_seconds));

        let header = Header::new(self.key.jwt_algorithm());
        encode(&header, &payload, self.key.encoding_key())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the signature and expiry of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::InvalidArgument);
        }

        let data = decode::<Claims>(token, self.key.decoding_key(), &self.validation)
            .map_err(map_decode_error)?;
        let claims = data.claims;

        if claims.subject().map_or(true, |s| s.trim().is_empty()) {
            return Err(TokenError::MalformedToken(
                "missing or blank subject".to_string(),
            ));
        }

        let expired_at = claims.expiration().ok_or_else(|| {
            TokenError::MalformedToken("missing or non-integer expiration".to_string())
        })?;

        // Millisecond precision: a token is stale as soon as `now` passes `exp`
        let now = self.now();
        if expired_at.saturating_mul(1000) < now.timestamp_millis() {
            return Err(TokenError::Expired {
                expired_at,
                now: now.timestamp(),
            });
        }

        Ok(claims)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        _ => TokenError::MalformedToken(err.to_string()),
    }
}
