// Revocation integration tests
//
// Signature and expiry checks pass in every test here; only the revocation
// store decides the outcome.

use std::sync::Arc;
use std::time::Duration;

use kagi::filter::{AuthState, Authentication};
use kagi::identity::Identity;
use kagi::login::LoginRequest;
use kagi::revocation::MemoryRevoker;

use super::test_harness::{
    request, runtime_at, runtime_with, Script, ScriptedRevoker, ALICE_PASSWORD, NOW,
};

#[tokio::test]
async fn test_revoked_token_never_authenticates() {
    let revoker = ScriptedRevoker::new(Script::Invalidated);
    let runtime = runtime_with(NOW, revoker.clone());
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    // The token itself is fine
    assert!(runtime.tokens().identity_from_token(&token).is_ok());

    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
    assert!(req.extensions().get::<Authentication>().is_none());
    assert_eq!(revoker.checks(), 1);
}

#[tokio::test]
async fn test_store_error_fails_closed() {
    let revoker = ScriptedRevoker::new(Script::Fail);
    let runtime = runtime_with(NOW, revoker.clone());
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
}

#[tokio::test]
async fn test_store_timeout_fails_closed() {
    let revoker = ScriptedRevoker::new(Script::Hang);
    let runtime = runtime_with(NOW, revoker.clone());
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let started = std::time::Instant::now();
    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
    // Bounded by revocation_timeout_ms (500ms default), not the 30s hang
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_valid_answer_authenticates() {
    let revoker = ScriptedRevoker::new(Script::Valid);
    let runtime = runtime_with(NOW, revoker.clone());
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Authenticated
    );
}

#[tokio::test]
async fn test_disabled_revocation_makes_no_calls() {
    let runtime = runtime_at(NOW);
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Authenticated
    );
}

#[tokio::test]
async fn test_unsecured_path_skips_revocation() {
    let revoker = ScriptedRevoker::new(Script::Fail);
    let runtime = runtime_with(NOW, revoker.clone());

    let mut req = request("/public/logo.png", Some("whatever"));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Bypassed
    );
    assert_eq!(revoker.checks(), 0);
}

#[tokio::test]
async fn test_memory_revoker_end_to_end() {
    let revoker = Arc::new(MemoryRevoker::new(Duration::from_secs(3600)));
    let runtime = runtime_with(NOW, revoker.clone());
    let login = runtime.login().unwrap();

    let first = login
        .login(&LoginRequest::new("alice", ALICE_PASSWORD))
        .await
        .unwrap()
        .token;

    let mut req = request("/api/orders", Some(&first));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Authenticated
    );

    revoker.revoke(&first).await;

    let mut req = request("/api/orders", Some(&first));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
}

#[tokio::test]
async fn test_memory_revoker_rejects_tokens_it_never_saw() {
    let revoker = Arc::new(MemoryRevoker::new(Duration::from_secs(3600)));
    let runtime = runtime_with(NOW, revoker);

    // Minted directly, bypassing the login that would have stored it
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
}

#[tokio::test]
async fn test_revoke_user_logs_out_every_session() {
    let revoker = Arc::new(MemoryRevoker::new(Duration::from_secs(3600)));
    let runtime = runtime_with(NOW, revoker.clone());
    let login = runtime.login().unwrap();

    let mut sessions = Vec::new();
    for _ in 0..2 {
        sessions.push(
            login
                .login(&LoginRequest::new("alice", ALICE_PASSWORD))
                .await
                .unwrap()
                .token,
        );
    }

    // Fixed clock and key: both logins mint the same token
    assert_eq!(sessions[0], sessions[1]);
    assert_eq!(revoker.revoke_user("alice").await, 1);

    for token in &sessions {
        let mut req = request("/api/orders", Some(token));
        assert_eq!(
            runtime.filter().authenticate(&mut req).await,
            AuthState::Unauthenticated
        );
    }
}
