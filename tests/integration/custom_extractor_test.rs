// Custom claims extractor integration tests
//
// A host-provided extractor registered on the runtime rides along with the
// default ones, both when issuing and when restoring.

use std::sync::Arc;

use kagi::extractors::ClaimsExtractor;
use kagi::identity::{Identity, IdentityBuilder};
use kagi::token::{Claims, FixedClock};
use kagi::AuthRuntime;

use super::test_harness::{load_config, base_yaml, NOW};

/// Adds a fixed tenant claim and grants a tenant authority on restore.
struct TenantExtractor {
    tenant: &'static str,
}

impl ClaimsExtractor for TenantExtractor {
    fn name(&self) -> &str {
        "tenant"
    }

    fn embed(&self, _identity: &Identity, claims: &mut Claims) {
        claims.insert("tenant", self.tenant);
    }

    fn restore(&self, claims: &Claims, builder: &mut IdentityBuilder) {
        if let Some(tenant) = claims.get_str("tenant") {
            let mut authorities: Vec<String> = claims
                .get_string_list("authorities")
                .unwrap_or_default();
            authorities.push(format!("tenant:{}", tenant));
            builder.authorities(authorities);
        }
    }
}

/// Writes the `authorities` key, colliding with the default extractor.
struct OverrideAuthorities;

impl ClaimsExtractor for OverrideAuthorities {
    fn name(&self) -> &str {
        "override-authorities"
    }

    fn embed(&self, _identity: &Identity, claims: &mut Claims) {
        claims.insert("authorities", serde_json::json!(["overridden"]));
    }

    fn restore(&self, _claims: &Claims, _builder: &mut IdentityBuilder) {}
}

fn runtime(extractors: Vec<Arc<dyn ClaimsExtractor>>) -> AuthRuntime {
    let config = load_config(&base_yaml());
    let mut builder =
        AuthRuntime::builder(config.auth).clock(Arc::new(FixedClock::at_timestamp(NOW)));
    for extractor in extractors {
        builder = builder.extractor(extractor);
    }
    builder.build().expect("Failed to build runtime")
}

#[test]
fn test_custom_extractor_runs_after_defaults() {
    let runtime = runtime(vec![Arc::new(TenantExtractor { tenant: "acme" })]);
    let tokens = runtime.tokens();

    assert_eq!(
        tokens.chain().names(),
        vec!["authorities", "account-flags", "tenant"]
    );

    let token = tokens
        .generate_token(&Identity::builder("alice").authorities(["r1"]).build())
        .unwrap();
    let identity = tokens.identity_from_token(&token).unwrap();

    assert_eq!(
        identity.authorities(),
        ["r1".to_string(), "tenant:acme".to_string()]
    );
}

#[test]
fn test_later_extractor_wins_on_the_wire() {
    let runtime = runtime(vec![Arc::new(OverrideAuthorities)]);
    let tokens = runtime.tokens();

    let token = tokens
        .generate_token(&Identity::builder("alice").authorities(["r1", "r2"]).build())
        .unwrap();
    let claims = tokens.codec().verify(&token).unwrap();

    assert_eq!(
        claims.get_string_list("authorities"),
        Some(vec!["overridden".to_string()])
    );
    assert_eq!(
        tokens.identity_from_token(&token).unwrap().authorities(),
        ["overridden".to_string()]
    );
}

#[test]
fn test_claims_keep_chain_order_then_reserved_keys() {
    let runtime = runtime(vec![Arc::new(TenantExtractor { tenant: "acme" })]);
    let tokens = runtime.tokens();

    let token = tokens
        .generate_token(&Identity::builder("alice").build())
        .unwrap();
    let claims = tokens.codec().verify(&token).unwrap();

    assert_eq!(
        claims.keys().collect::<Vec<_>>(),
        vec![
            "authorities",
            "credentialsExpired",
            "accountExpired",
            "accountLocked",
            "enabled",
            "tenant",
            "sub",
            "iat",
            "exp"
        ]
    );
}
