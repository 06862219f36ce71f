// Request filter integration tests
//
// The filter always forwards the request; the downstream handler decides
// what to do with the recorded state.

use http::{Request, Response, StatusCode};
use kagi::filter::{require_authentication, AuthState, Authentication};
use kagi::identity::Identity;

use super::test_harness::{request, runtime_at, NOW};

/// Downstream handler that requires an authenticated identity.
async fn protected(req: Request<()>) -> Response<String> {
    match require_authentication(&req) {
        Ok(auth) => Response::new(format!("hello {}", auth.username())),
        Err(unauthorized) => unauthorized,
    }
}

/// Downstream handler that serves anyone.
async fn open(req: Request<()>) -> Response<String> {
    let state = req.extensions().get::<AuthState>().copied();
    Response::new(format!("{:?}", state))
}

#[tokio::test]
async fn test_unsecured_path_without_header_reaches_handler() {
    let runtime = runtime_at(NOW);
    let filter = runtime.filter();

    for path in ["/public/index.html", "/public", "/health", "/authenticate"] {
        let response = filter.handle(request(path, None), open).await;
        assert_eq!(response.status(), StatusCode::OK, "path {}", path);
        assert_eq!(response.body(), "Some(Bypassed)", "path {}", path);
    }
}

#[tokio::test]
async fn test_protected_path_without_token_reaches_handler_unauthenticated() {
    let runtime = runtime_at(NOW);

    let response = runtime
        .filter()
        .handle(request("/api/orders", None), open)
        .await;
    assert_eq!(response.body(), "Some(Unauthenticated)");

    // Rejection comes from the handler, not the filter
    let response = runtime
        .filter()
        .handle(request("/api/orders", None), protected)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.body(), "Unauthorized");
}

#[tokio::test]
async fn test_valid_token_reaches_protected_handler() {
    let runtime = runtime_at(NOW);
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").authorities(["r1"]).build())
        .unwrap();

    let response = runtime
        .filter()
        .handle(request("/api/orders", Some(&token)), protected)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), "hello alice");
}

#[tokio::test]
async fn test_token_from_other_key_is_unauthenticated() {
    // A runtime without a configured secret generates its own key
    let config = super::test_harness::load_config("auth:\n  timezone: UTC\n");
    let foreign = kagi::AuthRuntime::builder(config.auth)
        .clock(std::sync::Arc::new(kagi::token::FixedClock::at_timestamp(NOW)))
        .build()
        .unwrap();
    let token = foreign
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let runtime = runtime_at(NOW);
    let mut req = request("/api/orders", Some(&token));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
}

#[tokio::test]
async fn test_earlier_authentication_is_not_replaced() {
    let runtime = runtime_at(NOW);
    let token = runtime
        .tokens()
        .generate_token(&Identity::builder("alice").build())
        .unwrap();

    let mut req = request("/api/orders", Some(&token));
    let earlier = Authentication::new(Identity::builder("service-account").build());
    req.extensions_mut().insert(earlier.clone());

    let response = runtime.filter().handle(req, protected).await;
    assert_eq!(response.body(), "hello service-account");
}

#[tokio::test]
async fn test_tampered_token_is_unauthenticated() {
    let runtime = runtime_at(NOW);
    let tokens = runtime.tokens();
    let alice = tokens
        .generate_token(&Identity::builder("alice").build())
        .unwrap();
    let admin = tokens
        .generate_token(&Identity::builder("admin").build())
        .unwrap();

    // Admin payload under alice's signature
    let alice_parts: Vec<&str> = alice.split('.').collect();
    let admin_parts: Vec<&str> = admin.split('.').collect();
    let tampered = format!("{}.{}.{}", alice_parts[0], admin_parts[1], alice_parts[2]);

    let mut req = request("/api/orders", Some(&tampered));
    assert_eq!(
        runtime.filter().authenticate(&mut req).await,
        AuthState::Unauthenticated
    );
}

#[tokio::test]
async fn test_concurrent_requests_share_one_filter() {
    let runtime = runtime_at(NOW);
    let filter = runtime.filter();
    let tokens = runtime.tokens();

    let mut handles = Vec::new();
    for i in 0..16 {
        let filter = filter.clone();
        let token = tokens
            .generate_token(&Identity::builder(format!("user{}", i)).build())
            .unwrap();
        handles.push(tokio::spawn(async move {
            let mut req = request("/api/orders", Some(&token));
            let state = filter.authenticate(&mut req).await;
            let username = req
                .extensions()
                .get::<Authentication>()
                .map(|a| a.username().to_string());
            (state, username)
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let (state, username) = handle.await.unwrap();
        assert_eq!(state, AuthState::Authenticated);
        assert_eq!(username, Some(format!("user{}", i)));
    }
}
