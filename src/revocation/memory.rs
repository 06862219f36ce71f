//! In-process revocation store backed by moka.
//!
//! Works as an allow-list: a token is valid only while its fingerprint is in
//! the cache. Entries expire together with the token, and a token this store
//! never saw (for example one issued before a restart) counts as invalidated.

use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::TokenRevoker;
use crate::error::RevocationError;
use crate::identity::Identity;

/// Hex SHA-256 of a token; the raw token is never kept.
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub struct MemoryRevoker {
    // fingerprint -> username
    issued: moka::future::Cache<String, String>,
}

impl MemoryRevoker {
    /// `ttl` should match the token time-to-live.
    pub fn new(ttl: Duration) -> Self {
        let issued = moka::future::Cache::builder().time_to_live(ttl).build();
        Self { issued }
    }

    /// Invalidate a single token.
    pub async fn revoke(&self, token: &str) {
        self.issued.invalidate(&fingerprint(token)).await;
        tracing::info!("token revoked");
    }

    /// Invalidate every token issued to `username`; returns how many were live.
    pub async fn revoke_user(&self, username: &str) -> usize {
        let fingerprints: Vec<String> = self
            .issued
            .iter()
            .filter(|(_, owner)| owner == username)
            .map(|(fp, _)| (*fp).clone())
            .collect();

        let count = fingerprints.len();
        for fp in fingerprints {
            self.issued.invalidate(&fp).await;
        }
        self.issued.run_pending_tasks().await;

        tracing::info!(username, count, "tokens revoked for user");
        count
    }

    /// Approximate number of live tokens.
    pub async fn live_tokens(&self) -> u64 {
        self.issued.run_pending_tasks().await;
        self.issued.entry_count()
    }
}

#[async_trait]
impl TokenRevoker for MemoryRevoker {
    async fn store(&self, identity: &Identity, token: &str) -> Result<(), RevocationError> {
        self.issued
            .insert(fingerprint(token), identity.username().to_string())
            .await;
        Ok(())
    }

    async fn was_invalidated(
        &self,
        identity: &Identity,
        token: &str,
    ) -> Result<bool, RevocationError> {
        match self.issued.get(&fingerprint(token)).await {
            Some(owner) => Ok(owner != identity.username()),
            None => Ok(true),
        }
    }
}
