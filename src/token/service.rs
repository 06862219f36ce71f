//! Token issue and identity restoration on top of the codec and the chain.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::codec::TokenCodec;
use crate::error::TokenError;
use crate::extractors::ClaimsExtractorChain;
use crate::identity::{Identity, IdentityBuilder};

pub struct TokenService {
    codec: Arc<TokenCodec>,
    chain: Arc<ClaimsExtractorChain>,
}

impl TokenService {
    pub fn new(codec: Arc<TokenCodec>, chain: Arc<ClaimsExtractorChain>) -> Self {
        TokenService { codec, chain }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn chain(&self) -> &ClaimsExtractorChain {
        &self.chain
    }

    /// Embed `identity` through the chain and sign it with the username as subject.
    pub fn generate_token(&self, identity: &Identity) -> Result<String, TokenError> {
        let claims = self.chain.embed(identity);
        let token = self.codec.sign(&claims, identity.username())?;
        tracing::debug!(username = identity.username(), "token generated");
        Ok(token)
    }

    /// Verify `token` and rebuild the identity it carries.
    pub fn identity_from_token(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = self.codec.verify(token)?;
        // verify() guarantees a non-blank subject
        let username = claims.subject().unwrap_or_default();

        let mut builder = IdentityBuilder::new(username);
        self.chain.restore(&claims, &mut builder);
        Ok(builder.build())
    }

    pub fn username_from_token(&self, token: &str) -> Result<String, TokenError> {
        let claims = self.codec.verify(token)?;
        Ok(claims.subject().unwrap_or_default().to_string())
    }

    pub fn expiration_from_token(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let claims = self.codec.verify(token)?;
        claims
            .expiration()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| TokenError::MalformedToken("expiration out of range".to_string()))
    }
}
