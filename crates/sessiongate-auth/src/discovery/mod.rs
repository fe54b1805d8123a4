//! # Issuer Metadata Discovery
//!
//! Fetches and caches OpenID Connect Discovery 1.0 documents
//! (`{issuer}/.well-known/openid-configuration`).
//!
//! ## Caching Strategy
//!
//! - Respects HTTP `Cache-Control` headers (`max-age`, `no-cache`, `no-store`)
//! - Default cache TTL: 1 hour (if no headers present)
//! - Maximum cache TTL: 24 hours (capped)
//! - Per-issuer entries, replaced on expiry
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sessiongate_auth::config::FetchConfig;
//! use sessiongate_auth::discovery::MetadataCache;
//! use sessiongate_auth::fetch::Fetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = MetadataCache::new(Fetcher::new(FetchConfig::default())?);
//! let metadata = cache
//!     .get(
//!         "https://example.oktapreview.com",
//!         "https://example.oktapreview.com/.well-known/openid-configuration",
//!     )
//!     .await?;
//! println!("keys at {}", metadata.jwks_uri);
//! # Ok(())
//! # }
//! ```

mod cache;
mod types;

pub use cache::MetadataCache;
pub use types::IssuerMetadata;
