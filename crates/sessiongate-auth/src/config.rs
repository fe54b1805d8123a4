//! Verifier configuration
//!
//! Plain data with `Default` and chaining setters. Nothing here touches the
//! network.

use std::collections::HashMap;
use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Limits applied to every metadata / JWKS request
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout (default: 5 seconds)
    pub request_timeout: Duration,

    /// Maximum response size in bytes (default: 64 KiB)
    pub max_response_size: usize,

    /// TTL when the response carries no `Cache-Control: max-age` (default: 1 hour)
    pub default_cache_ttl: Duration,

    /// Upper bound for provider-specified TTLs (default: 24 hours)
    pub max_cache_ttl: Duration,

    /// Reject plain-HTTP URLs unless the host is loopback (default: true)
    pub require_https: bool,

    /// User agent for outgoing requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            max_response_size: 64 * 1024,
            default_cache_ttl: Duration::from_secs(3600),
            max_cache_ttl: Duration::from_secs(86400),
            require_https: true,
            user_agent: format!("sessiongate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration for [`TokenVerifier`](crate::TokenVerifier)
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Accepted signing algorithms. Never add `none` or HMAC algorithms here.
    pub allowed_algorithms: Vec<Algorithm>,

    /// Clock skew tolerated on `exp` (default: none)
    pub leeway: Duration,

    /// Per-issuer override of the metadata document URL
    pub metadata_urls: HashMap<String, String>,

    /// HTTP limits and cache TTL policy
    pub fetch: FetchConfig,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            allowed_algorithms: vec![
                Algorithm::RS256,
                Algorithm::RS384,
                Algorithm::RS512,
                Algorithm::ES256,
                Algorithm::PS256,
            ],
            leeway: Duration::ZERO,
            metadata_urls: HashMap::new(),
            fetch: FetchConfig::default(),
        }
    }
}

impl VerifierConfig {
    /// Tolerate clock skew on `exp`
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Read metadata for `issuer` from `url` instead of `{issuer}/.well-known/openid-configuration`
    #[must_use]
    pub fn with_metadata_url(mut self, issuer: impl Into<String>, url: impl Into<String>) -> Self {
        self.metadata_urls.insert(issuer.into(), url.into());
        self
    }

    /// Replace the fetch limits
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Allow plain-HTTP provider URLs on any host (tests, local providers)
    #[must_use]
    pub fn allow_insecure_http(mut self) -> Self {
        self.fetch.require_https = false;
        self
    }

    /// Metadata document URL for an issuer
    pub fn metadata_url_for(&self, issuer: &str) -> String {
        self.metadata_urls.get(issuer).cloned().unwrap_or_else(|| {
            format!(
                "{}/.well-known/openid-configuration",
                issuer.trim_end_matches('/')
            )
        })
    }
}
