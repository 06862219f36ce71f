//! Authenticated user identity and its builder.

use serde::{Deserialize, Serialize};

/// Immutable identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    username: String,
    authorities: Vec<String>,
    account_expired: bool,
    account_locked: bool,
    credentials_expired: bool,
    enabled: bool,
}

impl Identity {
    /// Shortcut for [`IdentityBuilder::new`].
    pub fn builder(username: impl Into<String>) -> IdentityBuilder {
        IdentityBuilder::new(username)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Authorities in first-seen order, without duplicates.
    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    pub fn is_account_expired(&self) -> bool {
        self.account_expired
    }

    pub fn is_account_locked(&self) -> bool {
        self.account_locked
    }

    pub fn is_credentials_expired(&self) -> bool {
        self.credentials_expired
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Accumulates identity fields restored from claims.
///
/// Every setter replaces the previous value. Fields never set keep their
/// defaults: no authorities, not expired, not locked, enabled.
#[derive(Debug, Clone)]
pub struct IdentityBuilder {
    username: String,
    authorities: Vec<String>,
    account_expired: bool,
    account_locked: bool,
    credentials_expired: bool,
    enabled: bool,
}

impl IdentityBuilder {
    pub fn new(username: impl Into<String>) -> Self {
        IdentityBuilder {
            username: username.into(),
            authorities: Vec::new(),
            account_expired: false,
            account_locked: false,
            credentials_expired: false,
            enabled: true,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn authorities<I, S>(&mut self, authorities: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for authority in authorities {
            let authority = authority.into();
            if !unique.contains(&authority) {
                unique.push(authority);
            }
        }
        self.authorities = unique;
        self
    }

    pub fn account_expired(&mut self, value: bool) -> &mut Self {
        self.account_expired = value;
        self
    }

    pub fn account_locked(&mut self, value: bool) -> &mut Self {
        self.account_locked = value;
        self
    }

    pub fn credentials_expired(&mut self, value: bool) -> &mut Self {
        self.credentials_expired = value;
        self
    }

    pub fn enabled(&mut self, value: bool) -> &mut Self {
        self.enabled = value;
        self
    }

    pub fn build(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            authorities: self.authorities.clone(),
            account_expired: self.account_expired,
            account_locked: self.account_locked,
            credentials_expired: self.credentials_expired,
            enabled: self.enabled,
        }
    }
}
