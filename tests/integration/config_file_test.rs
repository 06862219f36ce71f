// Configuration to runtime integration tests
//
// Startup must either produce a working runtime or fail with ConfigError
// before any filter exists.

use std::str::FromStr;
use std::sync::Arc;

use kagi::config::{AuthConfig, Config};
use kagi::error::ConfigError;
use kagi::filter::AuthState;
use kagi::identity::Identity;
use kagi::token::{FixedClock, SignatureAlgorithm, SigningKey};
use kagi::AuthRuntime;
use rstest::rstest;

use super::test_harness::{load_config, request, NOW, SECRET};

fn build(config: AuthConfig) -> Result<AuthRuntime, ConfigError> {
    AuthRuntime::builder(config)
        .clock(Arc::new(FixedClock::at_timestamp(NOW)))
        .build()
}

#[test]
fn test_secret_from_environment_variable() {
    std::env::set_var("KAGI_IT_SECRET", SECRET);
    let config = load_config(
        r#"auth:
  secret: "${KAGI_IT_SECRET}"
  timezone: UTC
"#,
    );
    std::env::remove_var("KAGI_IT_SECRET");

    assert_eq!(config.auth.secret.as_deref(), Some(SECRET));
    let runtime = build(config.auth).expect("runtime should build");
    assert_eq!(
        runtime.tokens().codec().algorithm(),
        SignatureAlgorithm::HS256
    );
}

#[test]
fn test_unset_environment_variable_is_rejected() {
    let result = Config::from_yaml_with_env("auth:\n  secret: ${KAGI_IT_NEVER_SET}\n");
    assert_eq!(
        result,
        Err(ConfigError::MissingEnvVar("KAGI_IT_NEVER_SET".to_string()))
    );
}

#[test]
fn test_weak_secret_prevents_startup() {
    let config = load_config(
        r#"auth:
  secret: "too-short-for-hs512"
  algorithm: HS512
"#,
    );

    let result = build(config.auth);
    assert!(
        matches!(result, Err(ConfigError::WeakKey { required: 512, .. })),
        "weak secret must abort startup"
    );
}

#[test]
fn test_unknown_algorithm_fails_validation() {
    let config = Config::from_yaml_with_env("auth:\n  algorithm: HS999\n").unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnknownAlgorithm("HS999".to_string()))
    );
}

#[test]
fn test_es512_fails_at_startup() {
    let config = load_config("auth:\n  algorithm: ES512\n");
    assert!(matches!(
        build(config.auth),
        Err(ConfigError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn test_generated_key_does_not_survive_restart() {
    let config = load_config("auth:\n  timezone: UTC\n");

    let before = build(config.auth.clone()).unwrap();
    let token = before
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let after = build(config.auth).unwrap();
    assert!(before.tokens().identity_from_token(&token).is_ok());
    assert!(after.tokens().identity_from_token(&token).is_err());
}

#[rstest]
#[case("HS384")]
#[case("RS256")]
#[case("PS512")]
#[case("ES256")]
#[case("ES384")]
#[case("EdDSA")]
#[tokio::test]
async fn test_configured_secret_authenticates_requests(#[case] algorithm: &str) {
    let (_, secret) = SigningKey::generate(SignatureAlgorithm::from_str(algorithm).unwrap())
        .expect("key generation");
    let config = AuthConfig {
        algorithm: Some(algorithm.to_string()),
        secret: Some(secret),
        timezone: Some("UTC".to_string()),
        ..AuthConfig::default()
    };

    // Two runtimes over the same secret agree on every token
    let issuer = build(config.clone()).unwrap();
    let verifier = build(config).unwrap();

    let identity = Identity::builder("alice").authorities(["r1", "r2"]).build();
    let token = issuer.tokens().generate_token(&identity).unwrap();

    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        verifier.filter().authenticate(&mut req).await,
        AuthState::Authenticated,
        "{} token should authenticate",
        algorithm
    );
}

#[tokio::test]
async fn test_timezone_shifts_token_lifetime() {
    // Issued with the clock read as Rome time, checked with the clock read as UTC
    let rome = load_config(&format!(
        "auth:\n  secret: \"{}\"\n  timezone: Europe/Rome\n",
        SECRET
    ));
    let utc = load_config(&format!("auth:\n  secret: \"{}\"\n  timezone: UTC\n", SECRET));

    let token = build(rome.auth)
        .unwrap()
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    // Rome is UTC+2 on that date, so the token already expired an hour ago in UTC terms
    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        build(utc.auth).unwrap().filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
}
