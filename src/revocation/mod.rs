//! Token revocation contract.
//!
//! A [`TokenRevoker`] records every issued token and answers whether a
//! presented token has been invalidated since. [`Revocation`] wraps the
//! optional revoker together with the timeout applied to each call.
//! `Revocation::Disabled` never calls anything.

pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::constants::DEFAULT_REVOCATION_TIMEOUT_MS;
use crate::error::RevocationError;
use crate::identity::Identity;

pub use memory::MemoryRevoker;

/// External store of issued tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRevoker: Send + Sync {
    /// Record a freshly issued token for `identity`.
    async fn store(&self, identity: &Identity, token: &str) -> Result<(), RevocationError>;

    /// Whether `token` has been invalidated.
    async fn was_invalidated(&self, identity: &Identity, token: &str)
        -> Result<bool, RevocationError>;
}

/// Revocation setting resolved at startup.
#[derive(Clone, Default)]
pub enum Revocation {
    /// No store: tokens are never checked or recorded.
    #[default]
    Disabled,
    Enabled {
        revoker: Arc<dyn TokenRevoker>,
        timeout: Duration,
    },
}

impl Revocation {
    pub fn enabled(revoker: Arc<dyn TokenRevoker>, timeout: Duration) -> Self {
        Revocation::Enabled { revoker, timeout }
    }

    /// Enabled with the default timeout.
    pub fn with_revoker(revoker: Arc<dyn TokenRevoker>) -> Self {
        Self::enabled(revoker, Duration::from_millis(DEFAULT_REVOCATION_TIMEOUT_MS))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Revocation::Enabled { .. })
    }

    /// Record `token`; a no-op when disabled.
    pub async fn store(&self, identity: &Identity, token: &str) -> Result<(), RevocationError> {
        match self {
            Revocation::Disabled => Ok(()),
            Revocation::Enabled { revoker, timeout } => {
                tokio::time::timeout(*timeout, revoker.store(identity, token))
                    .await
                    .map_err(|_| RevocationError::Timeout(*timeout))?
            }
        }
    }

    /// Ask the store about `token`; always `false` when disabled.
    pub async fn was_invalidated(
        &self,
        identity: &Identity,
        token: &str,
    ) -> Result<bool, RevocationError> {
        match self {
            Revocation::Disabled => Ok(false),
            Revocation::Enabled { revoker, timeout } => {
                tokio::time::timeout(*timeout, revoker.was_invalidated(identity, token))
                    .await
                    .map_err(|_| RevocationError::Timeout(*timeout))?
            }
        }
    }
}

impl std::fmt::Debug for Revocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revocation::Disabled => f.write_str("Disabled"),
            Revocation::Enabled { timeout, .. } => f
                .debug_struct("Enabled")
                .field("timeout", timeout)
                .finish_non_exhaustive(),
        }
    }
}
