//! Per-issuer metadata cache

use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use super::types::IssuerMetadata;
use crate::fetch::{FetchError, Fetcher};

#[derive(Debug, Clone)]
struct CacheEntry {
    metadata: Arc<IssuerMetadata>,
    expires_at: SystemTime,
}

impl CacheEntry {
    fn is_valid(&self) -> bool {
        SystemTime::now() < self.expires_at
    }
}

/// Cache of provider metadata keyed by issuer
///
/// Lookups that miss or find an expired entry fetch the document and
/// overwrite the entry. Concurrent misses for the same issuer each fetch;
/// whichever finishes last wins.
#[derive(Debug)]
pub struct MetadataCache {
    fetcher: Fetcher,
    entries: DashMap<String, CacheEntry>,
}

impl MetadataCache {
    /// Create an empty cache on top of `fetcher`
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            entries: DashMap::new(),
        }
    }

    /// Metadata for `issuer`, fetched from `metadata_url` when not cached
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] of the network request on a miss.
    pub async fn get(&self, issuer: &str, metadata_url: &str) -> Result<Arc<IssuerMetadata>, FetchError> {
        if let Some(entry) = self.entries.get(issuer)
            && entry.is_valid()
        {
            debug!(issuer, "Using cached issuer metadata");
            return Ok(Arc::clone(&entry.metadata));
        }

        info!(issuer, metadata_url, "Fetching issuer metadata");
        let fetched = self.fetcher.get_json::<IssuerMetadata>(metadata_url).await?;

        if fetched.value.issuer.trim_end_matches('/') != issuer.trim_end_matches('/') {
            // Org-level documents legitimately name a different issuer than a
            // custom authorization server; keys still come from its jwks_uri.
            warn!(
                issuer,
                document_issuer = %fetched.value.issuer,
                "Metadata document names a different issuer"
            );
        }

        let metadata = Arc::new(fetched.value);
        self.entries.insert(
            issuer.to_string(),
            CacheEntry {
                metadata: Arc::clone(&metadata),
                expires_at: SystemTime::now() + fetched.ttl,
            },
        );

        Ok(metadata)
    }

    /// Drop every cached document
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// `(total, valid)` entry counts
    pub fn counts(&self) -> (usize, usize) {
        let total = self.entries.len();
        let valid = self.entries.iter().filter(|e| e.is_valid()).count();
        (total, valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use std::time::Duration;

    fn entry(ttl_offset: i64) -> CacheEntry {
        let now = SystemTime::now();
        let expires_at = if ttl_offset >= 0 {
            now + Duration::from_secs(ttl_offset as u64)
        } else {
            now - Duration::from_secs(ttl_offset.unsigned_abs())
        };
        CacheEntry {
            metadata: Arc::new(IssuerMetadata {
                issuer: "https://idp.example.com".into(),
                jwks_uri: "https://idp.example.com/keys".into(),
                authorization_endpoint: None,
                token_endpoint: None,
                userinfo_endpoint: None,
                end_session_endpoint: None,
                introspection_endpoint: None,
                revocation_endpoint: None,
                scopes_supported: None,
                response_types_supported: None,
                id_token_signing_alg_values_supported: None,
                additional_fields: Default::default(),
            }),
            expires_at,
        }
    }

    #[test]
    fn test_entry_validity() {
        assert!(entry(600).is_valid());
        assert!(!entry(-1).is_valid());
    }

    #[test]
    fn test_counts_and_clear() {
        let cache = MetadataCache::new(Fetcher::new(FetchConfig::default()).unwrap());
        cache.entries.insert("a".into(), entry(600));
        cache.entries.insert("b".into(), entry(-10));
        assert_eq!(cache.counts(), (2, 1));

        cache.clear();
        assert_eq!(cache.counts(), (0, 0));
    }
}
