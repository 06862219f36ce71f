//! Claims extractors: pluggable components that move identity fields into
//! the token on issue and back into an [`IdentityBuilder`] on verify.
//!
//! Extractors share one flat claim namespace. The chain runs them in
//! registration order, so when two write the same key the later one wins.
//! An extractor must not rely on what another extractor did in the same pass.

pub mod authorities;
pub mod flags;

use std::sync::Arc;

use crate::identity::{Identity, IdentityBuilder};
use crate::token::Claims;

pub use authorities::AuthoritiesExtractor;
pub use flags::AccountFlagsExtractor;

/// One component of the claims chain.
pub trait ClaimsExtractor: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Write zero or more keys describing `identity` into `claims`.
    fn embed(&self, identity: &Identity, claims: &mut Claims);

    /// Read zero or more keys from `claims` and apply them to `builder`.
    fn restore(&self, claims: &Claims, builder: &mut IdentityBuilder);
}

/// Ordered list of extractors.
#[derive(Clone, Default)]
pub struct ClaimsExtractorChain {
    extractors: Vec<Arc<dyn ClaimsExtractor>>,
}

impl ClaimsExtractorChain {
    pub fn new(extractors: Vec<Arc<dyn ClaimsExtractor>>) -> Self {
        ClaimsExtractorChain { extractors }
    }

    /// Default extractors first (when enabled), then `extra` in the given order.
    pub fn with_defaults(enable_defaults: bool, extra: Vec<Arc<dyn ClaimsExtractor>>) -> Self {
        let mut extractors: Vec<Arc<dyn ClaimsExtractor>> = Vec::with_capacity(extra.len() + 2);
        if enable_defaults {
            extractors.push(Arc::new(AuthoritiesExtractor));
            extractors.push(Arc::new(AccountFlagsExtractor));
        }
        extractors.extend(extra);
        ClaimsExtractorChain { extractors }
    }

    pub fn push(&mut self, extractor: Arc<dyn ClaimsExtractor>) {
        self.extractors.push(extractor);
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Build the claim set for `identity` by running every extractor.
    pub fn embed(&self, identity: &Identity) -> Claims {
        tracing::debug!(extractors = self.extractors.len(), "embedding identity into claims");

        let mut claims = Claims::new();
        for extractor in &self.extractors {
            tracing::debug!(extractor = extractor.name(), "retrieving claims from identity");
            extractor.embed(identity, &mut claims);
        }
        claims
    }

    /// Apply `claims` to `builder` by running every extractor.
    pub fn restore(&self, claims: &Claims, builder: &mut IdentityBuilder) {
        tracing::debug!(extractors = self.extractors.len(), "restoring identity from claims");

        for extractor in &self.extractors {
            tracing::debug!(extractor = extractor.name(), "retrieving claims from token");
            extractor.restore(claims, builder);
        }
    }
}

impl std::fmt::Debug for ClaimsExtractorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
