//! Tower Layer for bearer authentication

use std::sync::Arc;

use tower::Layer;

use super::BearerAuthConfig;
use super::service::BearerAuthService;
use crate::TokenVerifier;

/// Tower Layer that puts [`BearerAuthService`] in front of a service
#[derive(Debug, Clone)]
pub struct BearerAuthLayer {
    verifier: Arc<TokenVerifier>,
    config: Arc<BearerAuthConfig>,
}

impl BearerAuthLayer {
    /// Enforce tokens for `audience` from `issuer`
    pub fn new(
        verifier: Arc<TokenVerifier>,
        audience: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self::with_config(verifier, BearerAuthConfig::new(audience, issuer))
    }

    /// Layer with a prepared configuration
    pub fn with_config(verifier: Arc<TokenVerifier>, config: BearerAuthConfig) -> Self {
        Self {
            verifier,
            config: Arc::new(config),
        }
    }

    /// Serve `path` without authentication
    #[must_use]
    pub fn bypass_path(mut self, path: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).bypass_paths.push(path.into());
        self
    }

    /// Layer configuration
    pub fn config(&self) -> &BearerAuthConfig {
        &self.config
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService::new(inner, Arc::clone(&self.verifier), Arc::clone(&self.config))
    }
}
