//! Per-request bearer token authentication.
//!
//! [`RequestFilter`] inspects an inbound `http::Request`, and when it carries
//! a valid, non-revoked bearer token it stores an [`Authentication`] in the
//! request extensions. The outcome is recorded as an [`AuthState`] in the
//! extensions as well, which makes a second pass over the same request a
//! no-op.
//!
//! The filter never rejects a request. Token problems only downgrade the
//! request to unauthenticated; deciding whether a route needs an identity is
//! left to [`entry_point`].

pub mod entry_point;
pub mod paths;

use std::future::Future;
use std::sync::Arc;

use http::Request;
use regex::Regex;

use crate::config::AuthConfig;
use crate::constants::AUTHORIZATION_HEADER;
use crate::error::ConfigError;
use crate::identity::Identity;
use crate::revocation::Revocation;
use crate::token::TokenService;

pub use entry_point::{authentication, require_authentication};
pub use paths::PathMatcher;

const BEARER_PATTERN: &str = "^Bearer (.+)$";

/// Where a request ended up after the filter ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// The filter has not processed the request yet.
    #[default]
    Unchecked,
    /// Path is unsecured; no token processing happened.
    Bypassed,
    /// No usable token, or the token failed verification or was revoked.
    Unauthenticated,
    /// A verified identity was stored in the request.
    Authenticated,
    /// An earlier stage already stored an authentication; it was left as is.
    Preserved,
}

impl AuthState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuthState::Unchecked)
    }
}

/// Authenticated principal stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    pub identity: Identity,
    pub authorities: Vec<String>,
}

impl Authentication {
    pub fn new(identity: Identity) -> Self {
        let authorities = identity.authorities().to_vec();
        Authentication {
            identity,
            authorities,
        }
    }

    pub fn username(&self) -> &str {
        self.identity.username()
    }
}

pub struct RequestFilter {
    tokens: Arc<TokenService>,
    unsecured: PathMatcher,
    revocation: Revocation,
    bearer: Regex,
}

impl RequestFilter {
    /// Compile the unsecured patterns (endpoint first) for this filter.
    pub fn new(
        config: &AuthConfig,
        tokens: Arc<TokenService>,
        revocation: Revocation,
    ) -> Result<Self, ConfigError> {
        let unsecured = PathMatcher::new(config.all_unsecured_paths())?;
        let bearer = Regex::new(BEARER_PATTERN)
            .map_err(|e| ConfigError::Invalid(format!("bearer pattern: {}", e)))?;

        tracing::info!(
            unsecured = ?unsecured.patterns().collect::<Vec<_>>(),
            revocation = revocation.is_enabled(),
            "request filter ready"
        );

        Ok(RequestFilter {
            tokens,
            unsecured,
            revocation,
            bearer,
        })
    }

    pub fn unsecured_paths(&self) -> &PathMatcher {
        &self.unsecured
    }

    /// Run the authentication state machine over `request`.
    pub async fn authenticate<B>(&self, request: &mut Request<B>) -> AuthState {
        if let Some(state) = request.extensions().get::<AuthState>() {
            if state.is_terminal() {
                tracing::debug!(state = ?state, "request already processed");
                return *state;
            }
        }

        let state = self.evaluate(request).await;
        request.extensions_mut().insert(state);
        state
    }

    /// Authenticate `request`, then hand it to `next` whatever the outcome.
    pub async fn handle<B, F, Fut>(&self, mut request: Request<B>, next: F) -> Fut::Output
    where
        F: FnOnce(Request<B>) -> Fut,
        Fut: Future,
    {
        let state = self.authenticate(&mut request).await;
        tracing::debug!(state = ?state, "invoking next stage");
        next(request).await
    }

    async fn evaluate<B>(&self, request: &mut Request<B>) -> AuthState {
        let path = request.uri().path();
        if let Some(pattern) = self.unsecured.find(path) {
            tracing::debug!(path, pattern, "unsecured path, bypassing token processing");
            return AuthState::Bypassed;
        }

        let token = match self.bearer_token(request) {
            Some(token) => token,
            None => {
                tracing::debug!("no bearer token in request");
                return AuthState::Unauthenticated;
            }
        };

        let identity = match self.tokens.identity_from_token(&token) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "token rejected");
                return AuthState::Unauthenticated;
            }
        };

        if request.extensions().get::<Authentication>().is_some() {
            tracing::debug!(
                username = identity.username(),
                "authentication already present, leaving it untouched"
            );
            return AuthState::Preserved;
        }

        if self.revocation.is_enabled() && self.was_invalidated(&identity, &token).await {
            tracing::debug!(username = identity.username(), "token was invalidated");
            return AuthState::Unauthenticated;
        }

        tracing::debug!(username = identity.username(), "adding authentication to request");
        request
            .extensions_mut()
            .insert(Authentication::new(identity));
        AuthState::Authenticated
    }

    fn bearer_token<B>(&self, request: &Request<B>) -> Option<String> {
        let header = request.headers().get(AUTHORIZATION_HEADER)?.to_str().ok()?;
        if header.trim().is_empty() {
            return None;
        }
        let captures = self.bearer.captures(header)?;
        let token = captures.get(1)?.as_str().trim();
        if token.is_empty() {
            return None;
        }
        Some(token.to_string())
    }

    // Errors and timeouts count as invalidated
    async fn was_invalidated(&self, identity: &Identity, token: &str) -> bool {
        match self.revocation.was_invalidated(identity, token).await {
            Ok(invalidated) => invalidated,
            Err(e) => {
                tracing::error!(
                    username = identity.username(),
                    error = %e,
                    "error while checking if token was invalidated"
                );
                true
            }
        }
    }
}
