// Authorities extractor: the identity's authority list under `authorities`

use serde_json::Value;

use super::ClaimsExtractor;
use crate::identity::{Identity, IdentityBuilder};
use crate::token::Claims;

pub const AUTHORITIES: &str = "authorities";

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthoritiesExtractor;

impl ClaimsExtractor for AuthoritiesExtractor {
    fn name(&self) -> &str {
        "authorities"
    }

    fn embed(&self, identity: &Identity, claims: &mut Claims) {
        tracing::debug!(
            count = identity.authorities().len(),
            "found authorities in identity"
        );
        let list: Vec<Value> = identity
            .authorities()
            .iter()
            .map(|a| Value::String(a.clone()))
            .collect();
        claims.insert(AUTHORITIES, Value::Array(list));
    }

    fn restore(&self, claims: &Claims, builder: &mut IdentityBuilder) {
        let authorities = claims.get_string_list(AUTHORITIES).unwrap_or_default();
        tracing::debug!(count = authorities.len(), "found authorities in token");

        if !authorities.is_empty() {
            builder.authorities(authorities);
        }
    }
}
