//! Login flow: check credentials, mint a token, record it.
//!
//! Transport is up to the host. A handler deserializes a [`LoginRequest`],
//! calls [`LoginService::login`] and answers with the [`LoginResponse`] or
//! with [`LoginError::status_code`].

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AuthenticatorError, LoginError};
use crate::identity::Identity;
use crate::revocation::Revocation;
use crate::token::TokenService;

pub use memory::InMemoryAuthenticator;

/// Credential check supplied by the host application.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str)
        -> Result<Identity, AuthenticatorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

pub struct LoginService {
    authenticator: Arc<dyn Authenticator>,
    tokens: Arc<TokenService>,
    revocation: Revocation,
}

impl LoginService {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        tokens: Arc<TokenService>,
        revocation: Revocation,
    ) -> Self {
        LoginService {
            authenticator,
            tokens,
            revocation,
        }
    }

    /// Exchange credentials for a token.
    ///
    /// When revocation is enabled the token is stored before it is returned;
    /// a failed store rejects the login.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, LoginError> {
        let username = request.username.as_str();
        if username.trim().is_empty() {
            return Err(LoginError::InvalidRequest("username is mandatory".to_string()));
        }
        tracing::debug!(username, "processing login request");

        let identity = self
            .authenticator
            .authenticate(username, &request.password)
            .await
            .map_err(|e| {
                tracing::error!(username, error = %e, "authentication failed");
                LoginError::BadCredentials
            })?;

        let token = self.tokens.generate_token(&identity)?;

        if self.revocation.is_enabled() {
            tracing::debug!(username, "storing token");
            self.revocation
                .store(&identity, &token)
                .await
                .map_err(|e| {
                    tracing::error!(username, error = %e, "error occurred while storing token");
                    LoginError::Revocation(e)
                })?;
        }

        tracing::info!(username, "login succeeded");
        Ok(LoginResponse { token })
    }
}
