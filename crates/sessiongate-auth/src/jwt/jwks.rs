//! JWKS (JSON Web Key Set) fetching and caching
//!
//! - **TTL-based caching**: same policy as issuer metadata (`Cache-Control`,
//!   1 hour fallback, 24 hour cap)
//! - **Refresh on unknown `kid`**: [`JwksCache::refresh`] bypasses the cache so
//!   the verifier can pick up rotated keys
//! - **Shared**: entries are `Arc`ed and handed out read-only

use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use jsonwebtoken::jwk::JwkSet;
use tracing::{debug, info};

use crate::fetch::{FetchError, Fetcher};

/// JWKS cache entry with metadata
#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: Arc<JwkSet>,
    expires_at: SystemTime,
}

impl CachedJwks {
    fn is_valid(&self) -> bool {
        SystemTime::now() < self.expires_at
    }
}

/// Key sets keyed by JWKS URI
///
/// # Example
///
/// ```rust,no_run
/// # use sessiongate_auth::config::FetchConfig;
/// # use sessiongate_auth::fetch::Fetcher;
/// # use sessiongate_auth::jwt::JwksCache;
/// # tokio_test::block_on(async {
/// let cache = JwksCache::new(Fetcher::new(FetchConfig::default())?);
/// let jwks = cache.get("https://example.oktapreview.com/oauth2/v1/keys").await?;
/// if let Some(key) = jwks.find("key-id-123") {
///     // Use key for validation
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug)]
pub struct JwksCache {
    fetcher: Fetcher,
    entries: DashMap<String, CachedJwks>,
}

impl JwksCache {
    /// Create an empty cache on top of `fetcher`
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            entries: DashMap::new(),
        }
    }

    /// Key set at `jwks_uri`, from cache when still valid
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the network request on a miss.
    pub async fn get(&self, jwks_uri: &str) -> Result<Arc<JwkSet>, FetchError> {
        if let Some(cached) = self.entries.get(jwks_uri)
            && cached.is_valid()
        {
            debug!(jwks_uri, "Using cached JWKS");
            return Ok(Arc::clone(&cached.jwks));
        }

        self.fetch_and_cache(jwks_uri).await
    }

    /// Fetch `jwks_uri` ignoring the cache
    ///
    /// Use when a token references a key the cached set does not contain.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the network request.
    pub async fn refresh(&self, jwks_uri: &str) -> Result<Arc<JwkSet>, FetchError> {
        info!(jwks_uri, "Forcing JWKS refresh");
        self.fetch_and_cache(jwks_uri).await
    }

    async fn fetch_and_cache(&self, jwks_uri: &str) -> Result<Arc<JwkSet>, FetchError> {
        let fetched = self.fetcher.get_json::<JwkSet>(jwks_uri).await?;

        info!(
            jwks_uri,
            key_count = fetched.value.keys.len(),
            "Fetched JWKS"
        );

        let jwks = Arc::new(fetched.value);
        self.entries.insert(
            jwks_uri.to_string(),
            CachedJwks {
                jwks: Arc::clone(&jwks),
                expires_at: SystemTime::now() + fetched.ttl,
            },
        );
        Ok(jwks)
    }

    /// Drop every cached key set
    pub fn clear(&self) {
        self.entries.clear();
        debug!("JWKS cache cleared");
    }

    /// `(total, valid)` entry counts
    pub fn counts(&self) -> (usize, usize) {
        let total = self.entries.len();
        let valid = self.entries.iter().filter(|e| e.is_valid()).count();
        (total, valid)
    }
}
