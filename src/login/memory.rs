//! Authenticator over a fixed user list from configuration.

use std::collections::HashMap;
use std::sync::OnceLock;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use rand::rngs::OsRng;

use super::Authenticator;
use crate::config::UserConfig;
use crate::error::AuthenticatorError;
use crate::identity::Identity;

/// Argon2id PHC string for `password` under a fresh random salt, the format
/// expected in `password_hash`.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string; unparsable hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a PHC string");
            false
        }
    }
}

/// Hash checked for unknown users so they cost the same as known ones.
fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("decoy").ok())
        .as_deref()
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthenticator {
    users: HashMap<String, UserConfig>,
}

impl InMemoryAuthenticator {
    pub fn new(users: &[UserConfig]) -> Self {
        let users = users
            .iter()
            .map(|u| (u.username.clone(), u.clone()))
            .collect();
        InMemoryAuthenticator { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl Authenticator for InMemoryAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, AuthenticatorError> {
        let Some(user) = self.users.get(username) else {
            if let Some(decoy) = decoy_hash() {
                verify_password(password, decoy);
            }
            return Err(AuthenticatorError::BadCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            return Err(AuthenticatorError::BadCredentials);
        }

        if !user.enabled || user.account_locked || user.account_expired || user.credentials_expired
        {
            tracing::debug!(username, "account is not usable");
            return Err(AuthenticatorError::BadCredentials);
        }

        Ok(Identity::builder(username)
            .authorities(user.authorities.iter().cloned())
            .build())
    }
}
