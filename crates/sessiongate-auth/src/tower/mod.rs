//! # Tower Middleware for Bearer Authentication
//!
//! - [`BearerAuthLayer`] wraps a service with token verification
//! - [`BearerAuthService`] extracts `Authorization: Bearer <token>`, verifies
//!   it and inserts the [`Principal`](crate::Principal) into the request
//!   extensions
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Extension, Router, routing::get};
//! use sessiongate_auth::tower::BearerAuthLayer;
//! use sessiongate_auth::{Principal, TokenVerifier, VerifierConfig};
//!
//! # fn build() -> Result<Router, Box<dyn std::error::Error>> {
//! let verifier = Arc::new(TokenVerifier::new(VerifierConfig::default())?);
//! let app = Router::new()
//!     .route("/protected", get(|Extension(p): Extension<Principal>| async move { p.subject }))
//!     .route("/health", get(|| async { "ok" }))
//!     .layer(
//!         BearerAuthLayer::new(verifier, "api://default", "https://idp.example.com")
//!             .bypass_path("/health"),
//!     );
//! # Ok(app)
//! # }
//! ```
//!
//! ## Rejections
//!
//! | Failure                     | Status | Body                      |
//! |-----------------------------|--------|---------------------------|
//! | No / non-bearer credentials | 401    | `{"error": "..."}`        |
//! | Any token check             | 401    | `{"error": "..."}`        |
//! | Provider metadata or keys   | 503    | `{"error": "..."}`        |
//!
//! 401s carry an RFC 6750 `WWW-Authenticate` challenge.

mod layer;
mod rejection;
mod service;

pub use layer::BearerAuthLayer;
pub use rejection::AuthRejection;
pub use service::{BearerAuthService, BearerAuthServiceFuture};

/// Configuration for the bearer layer
#[derive(Debug, Clone)]
pub struct BearerAuthConfig {
    /// Audience tokens must be issued for
    pub audience: String,
    /// Issuer tokens must come from
    pub issuer: String,
    /// Request paths served without authentication
    pub bypass_paths: Vec<String>,
    /// Realm advertised in challenges
    pub realm: String,
}

impl BearerAuthConfig {
    /// Config for `audience`/`issuer` with no bypass paths
    pub fn new(audience: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            audience: audience.into(),
            issuer: issuer.into(),
            bypass_paths: Vec::new(),
            realm: "sessiongate".to_string(),
        }
    }

    /// Add a path to the bypass list
    #[must_use]
    pub fn bypass_path(mut self, path: impl Into<String>) -> Self {
        self.bypass_paths.push(path.into());
        self
    }

    /// Whether `path` skips authentication
    #[must_use]
    pub fn should_bypass(&self, path: &str) -> bool {
        self.bypass_paths.iter().any(|p| p == path)
    }
}

/// Token from an `Authorization` header value
///
/// The scheme is matched case-insensitively; empty tokens count as absent.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
