//! Signing key derivation, generation and strength validation.
//!
//! Secret formats by algorithm family:
//! - HMAC: the raw secret, used as its UTF-8 bytes
//! - RSA / ECDSA / EdDSA: a PKCS#8 PEM private key (PKCS#1 and SEC1 PEM are
//!   also read for RSA and ECDSA); the public half is derived from it
//!
//! A generated key exists only in memory. Tokens signed with it stop
//! verifying after a restart.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::{json, Map, Value};

use super::algorithm::{KeyFamily, SignatureAlgorithm};
use crate::constants::RSA_KEY_BITS;
use crate::error::ConfigError;

/// Encoding and decoding halves of the key for one algorithm.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: SignatureAlgorithm,
    jwt_algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Derive the key from a configured secret.
    pub fn from_secret(algorithm: SignatureAlgorithm, secret: &str) -> Result<Self, ConfigError> {
        let jwt_algorithm = algorithm.to_jwt_algorithm()?;
        let (encoding, decoding) = match algorithm.family() {
            KeyFamily::Hmac => hmac_keys(algorithm, secret)?,
            KeyFamily::Rsa => rsa_keys(algorithm, secret)?,
            KeyFamily::EcP256 => p256_keys(algorithm, secret)?,
            KeyFamily::EcP384 => p384_keys(algorithm, secret)?,
            KeyFamily::Ed25519 => ed25519_keys(algorithm, secret)?,
            KeyFamily::EcP521 => {
                return Err(ConfigError::UnsupportedAlgorithm(algorithm.id().to_string()))
            }
        };

        Ok(SigningKey {
            algorithm,
            jwt_algorithm,
            encoding,
            decoding,
        })
    }

    /// Generate a fresh secret for the algorithm and derive the key from it.
    ///
    /// Returns the key together with the secret in its configuration format.
    pub fn generate(algorithm: SignatureAlgorithm) -> Result<(Self, String), ConfigError> {
        // Fail on unsupported algorithms before spending time on key generation
        algorithm.to_jwt_algorithm()?;
        let secret = generate_secret(algorithm)?;
        let key = Self::from_secret(algorithm, &secret)?;
        Ok((key, secret))
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn jwt_algorithm(&self) -> Algorithm {
        self.jwt_algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// Sign and verify a sample payload with this key.
    pub fn self_test(&self) -> Result<(), ConfigError> {
        let sample = json!({ "sub": "kagi-key-check" });
        let header = Header::new(self.jwt_algorithm);
        let token = encode(&header, &sample, &self.encoding)
            .map_err(|e| ConfigError::KeyValidation(format!("signing failed: {}", e)))?;

        let mut validation = Validation::new(self.jwt_algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Map<String, Value>>(&token, &self.decoding, &validation)
            .map_err(|e| ConfigError::KeyValidation(format!("verification failed: {}", e)))?;

        if data.claims.get("sub") != sample.get("sub") {
            return Err(ConfigError::KeyValidation(
                "verified payload differs from the signed one".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid_key(algorithm: SignatureAlgorithm, reason: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidKey {
        algorithm: algorithm.id().to_string(),
        reason: reason.to_string(),
    }
}

fn generation_failed(algorithm: SignatureAlgorithm, reason: impl fmt::Display) -> ConfigError {
    ConfigError::KeyGeneration {
        algorithm: algorithm.id().to_string(),
        reason: reason.to_string(),
    }
}

fn hmac_keys(
    algorithm: SignatureAlgorithm,
    secret: &str,
) -> Result<(EncodingKey, DecodingKey), ConfigError> {
    let bytes = secret.as_bytes();
    let required = algorithm.min_hmac_key_bytes().unwrap_or_default();
    if bytes.len() < required {
        return Err(ConfigError::WeakKey {
            algorithm: algorithm.id().to_string(),
            required: required * 8,
            actual: bytes.len() * 8,
        });
    }
    Ok((
        EncodingKey::from_secret(bytes),
        DecodingKey::from_secret(bytes),
    ))
}

fn rsa_keys(
    algorithm: SignatureAlgorithm,
    secret: &str,
) -> Result<(EncodingKey, DecodingKey), ConfigError> {
    use rsa::pkcs1::DecodeRsaPrivateKey;
    use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
    use rsa::traits::PublicKeyParts;
    use rsa::RsaPrivateKey;

    let private = RsaPrivateKey::from_pkcs8_pem(secret)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(secret))
        .map_err(|e| invalid_key(algorithm, e))?;

    let bits = private.size() * 8;
    if bits < RSA_KEY_BITS {
        return Err(ConfigError::WeakKey {
            algorithm: algorithm.id().to_string(),
            required: RSA_KEY_BITS,
            actual: bits,
        });
    }

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;

    let encoding =
        EncodingKey::from_rsa_pem(private_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    let decoding =
        DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    Ok((encoding, decoding))
}

fn p256_keys(
    algorithm: SignatureAlgorithm,
    secret: &str,
) -> Result<(EncodingKey, DecodingKey), ConfigError> {
    use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
    use p256::SecretKey;

    let private = SecretKey::from_pkcs8_pem(secret)
        .or_else(|_| SecretKey::from_sec1_pem(secret))
        .map_err(|e| invalid_key(algorithm, e))?;

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;
    let public_pem = private
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;

    let encoding =
        EncodingKey::from_ec_pem(private_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    let decoding =
        DecodingKey::from_ec_pem(public_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    Ok((encoding, decoding))
}

fn p384_keys(
    algorithm: SignatureAlgorithm,
    secret: &str,
) -> Result<(EncodingKey, DecodingKey), ConfigError> {
    use p384::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
    use p384::SecretKey;

    let private = SecretKey::from_pkcs8_pem(secret)
        .or_else(|_| SecretKey::from_sec1_pem(secret))
        .map_err(|e| invalid_key(algorithm, e))?;

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;
    let public_pem = private
        .public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;

    let encoding =
        EncodingKey::from_ec_pem(private_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    let decoding =
        DecodingKey::from_ec_pem(public_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    Ok((encoding, decoding))
}

fn ed25519_keys(
    algorithm: SignatureAlgorithm,
    secret: &str,
) -> Result<(EncodingKey, DecodingKey), ConfigError> {
    use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
    use ed25519_dalek::pkcs8::{DecodePrivateKey, EncodePrivateKey};

    let private = ed25519_dalek::SigningKey::from_pkcs8_pem(secret)
        .map_err(|e| invalid_key(algorithm, e))?;

    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| invalid_key(algorithm, e))?;
    let public_x = URL_SAFE_NO_PAD.encode(private.verifying_key().to_bytes());

    let encoding =
        EncodingKey::from_ed_pem(private_pem.as_bytes()).map_err(|e| invalid_key(algorithm, e))?;
    let decoding =
        DecodingKey::from_ed_components(&public_x).map_err(|e| invalid_key(algorithm, e))?;
    Ok((encoding, decoding))
}

fn generate_secret(algorithm: SignatureAlgorithm) -> Result<String, ConfigError> {
    match algorithm.family() {
        KeyFamily::Hmac => {
            let mut bytes = vec![0u8; algorithm.min_hmac_key_bytes().unwrap_or(64)];
            OsRng.fill_bytes(&mut bytes);
            Ok(STANDARD.encode(bytes))
        }
        KeyFamily::Rsa => {
            use rsa::pkcs8::{EncodePrivateKey, LineEnding};

            let private = rsa::RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
                .map_err(|e| generation_failed(algorithm, e))?;
            let pem = private
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| generation_failed(algorithm, e))?;
            Ok(pem.to_string())
        }
        KeyFamily::EcP256 => {
            use p256::pkcs8::{EncodePrivateKey, LineEnding};

            let pem = p256::SecretKey::random(&mut OsRng)
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| generation_failed(algorithm, e))?;
            Ok(pem.to_string())
        }
        KeyFamily::EcP384 => {
            use p384::pkcs8::{EncodePrivateKey, LineEnding};

            let pem = p384::SecretKey::random(&mut OsRng)
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| generation_failed(algorithm, e))?;
            Ok(pem.to_string())
        }
        KeyFamily::Ed25519 => {
            use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;
            use ed25519_dalek::pkcs8::EncodePrivateKey;

            let pem = ed25519_dalek::SigningKey::generate(&mut OsRng)
                .to_pkcs8_pem(LineEnding::LF)
                .map_err(|e| generation_failed(algorithm, e))?;
            Ok(pem.to_string())
        }
        KeyFamily::EcP521 => Err(ConfigError::UnsupportedAlgorithm(
            algorithm.id().to_string(),
        )),
    }
}
