// Account flags extractor: the four boolean account states

use super::ClaimsExtractor;
use crate::identity::{Identity, IdentityBuilder};
use crate::token::Claims;

pub const CREDENTIALS_EXPIRED: &str = "credentialsExpired";
pub const ACCOUNT_EXPIRED: &str = "accountExpired";
pub const ACCOUNT_LOCKED: &str = "accountLocked";
pub const ENABLED: &str = "enabled";

#[derive(Debug, Clone, Copy, Default)]
pub struct AccountFlagsExtractor;

impl ClaimsExtractor for AccountFlagsExtractor {
    fn name(&self) -> &str {
        "account-flags"
    }

    fn embed(&self, identity: &Identity, claims: &mut Claims) {
        claims.insert(CREDENTIALS_EXPIRED, identity.is_credentials_expired());
        claims.insert(ACCOUNT_EXPIRED, identity.is_account_expired());
        claims.insert(ACCOUNT_LOCKED, identity.is_account_locked());
        claims.insert(ENABLED, identity.is_enabled());
    }

    fn restore(&self, claims: &Claims, builder: &mut IdentityBuilder) {
        // Keys that are missing or not booleans keep the builder defaults
        if let Some(value) = claims.get_bool(CREDENTIALS_EXPIRED) {
            builder.credentials_expired(value);
        }
        if let Some(value) = claims.get_bool(ACCOUNT_EXPIRED) {
            builder.account_expired(value);
        }
        if let Some(value) = claims.get_bool(ACCOUNT_LOCKED) {
            builder.account_locked(value);
        }
        if let Some(value) = claims.get_bool(ENABLED) {
            builder.enabled(value);
        }
    }
}
