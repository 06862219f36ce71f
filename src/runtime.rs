//! Startup wiring.
//!
//! [`AuthRuntime::builder`] derives the signing key, assembles the claims
//! chain and builds the filter and login service in one pass. Any error
//! aborts before a filter exists, so no request can observe a half-built
//! runtime. Afterwards everything is shared read-only through `Arc`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::AuthConfig;
use crate::error::ConfigError;
use crate::extractors::{ClaimsExtractor, ClaimsExtractorChain};
use crate::filter::RequestFilter;
use crate::login::{Authenticator, InMemoryAuthenticator, LoginService};
use crate::revocation::{Revocation, TokenRevoker};
use crate::token::{Clock, SystemClock, TokenCodec, TokenService};

pub struct AuthRuntimeBuilder {
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    extractors: Vec<Arc<dyn ClaimsExtractor>>,
    revoker: Option<Arc<dyn TokenRevoker>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl AuthRuntimeBuilder {
    fn new(config: AuthConfig) -> Self {
        AuthRuntimeBuilder {
            config,
            clock: Arc::new(SystemClock),
            extractors: Vec::new(),
            revoker: None,
            authenticator: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an extractor after the defaults and any added before.
    pub fn extractor(mut self, extractor: Arc<dyn ClaimsExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn revoker(mut self, revoker: Arc<dyn TokenRevoker>) -> Self {
        self.revoker = Some(revoker);
        self
    }

    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn build(self) -> Result<AuthRuntime, ConfigError> {
        let codec = Arc::new(TokenCodec::initialize(&self.config, self.clock)?);

        let chain = Arc::new(ClaimsExtractorChain::with_defaults(
            self.config.enable_default_extractors,
            self.extractors,
        ));
        tracing::info!(extractors = ?chain.names(), "claims extractor chain ready");

        let tokens = Arc::new(TokenService::new(codec, chain));

        let revocation = match self.revoker {
            Some(revoker) => Revocation::enabled(
                revoker,
                Duration::from_millis(self.config.revocation_timeout_ms),
            ),
            None => Revocation::Disabled,
        };

        let filter = Arc::new(RequestFilter::new(
            &self.config,
            tokens.clone(),
            revocation.clone(),
        )?);

        // Configured users stand in when the host brings no authenticator
        let authenticator = self.authenticator.or_else(|| {
            (!self.config.users.is_empty()).then(|| {
                Arc::new(InMemoryAuthenticator::new(&self.config.users)) as Arc<dyn Authenticator>
            })
        });
        let login = match authenticator {
            Some(authenticator) => Some(Arc::new(LoginService::new(
                authenticator,
                tokens.clone(),
                revocation,
            ))),
            None => {
                tracing::warn!("no authenticator configured: login is unavailable");
                None
            }
        };

        Ok(AuthRuntime {
            config: self.config,
            tokens,
            filter,
            login,
        })
    }
}

/// Everything needed to issue and check tokens.
pub struct AuthRuntime {
    config: AuthConfig,
    tokens: Arc<TokenService>,
    filter: Arc<RequestFilter>,
    login: Option<Arc<LoginService>>,
}

impl AuthRuntime {
    pub fn builder(config: AuthConfig) -> AuthRuntimeBuilder {
        AuthRuntimeBuilder::new(config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    pub fn filter(&self) -> Arc<RequestFilter> {
        self.filter.clone()
    }

    /// `None` when neither an authenticator nor configured users exist.
    pub fn login(&self) -> Option<Arc<LoginService>> {
        self.login.clone()
    }
}
