//! Bounded JSON fetching for provider documents
//!
//! Metadata and JWKS requests share one client: redirects are not followed,
//! every request has a timeout, bodies are size-capped, and plain HTTP is
//! refused unless the host is loopback.

use std::time::Duration;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

use crate::config::FetchConfig;

/// Fetch failures; callers surface these as `MetadataUnavailable`
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Plain HTTP to a non-loopback host
    #[error("refusing non-HTTPS URL: {0}")]
    InsecureUrl(String),

    /// Transport failure or timeout
    #[error("request failed: {0}")]
    Http(String),

    /// Non-success status code
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Body exceeded the configured limit
    #[error("response exceeds {limit} bytes")]
    ResponseTooLarge {
        /// Configured limit
        limit: usize,
    },

    /// Body was not the expected JSON document
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// A fetched document plus how long it may be cached
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Parsed body
    pub value: T,
    /// Cache lifetime derived from response headers
    pub ttl: Duration,
}

/// Shared HTTP fetcher
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Build a fetcher from limits
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the TLS backend cannot be initialised.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch limits in use
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url` and parse the body as `T`
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] variant; nothing is retried here.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Fetched<T>, FetchError> {
        self.check_url(url)?;

        let response = self
            .client
            .get(url)
            .header(http::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let ttl = cache_ttl(response.headers(), &self.config);

        if let Some(content_length) = response.content_length()
            && content_length > self.config.max_response_size as u64
        {
            return Err(FetchError::ResponseTooLarge {
                limit: self.config.max_response_size,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        if body.len() > self.config.max_response_size {
            return Err(FetchError::ResponseTooLarge {
                limit: self.config.max_response_size,
            });
        }

        let value = serde_json::from_slice(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))?;

        debug!(url, ttl_secs = ttl.as_secs(), bytes = body.len(), "Fetched provider document");
        Ok(Fetched { value, ttl })
    }

    fn check_url(&self, url: &str) -> Result<(), FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "https" => Ok(()),
            "http" if !self.config.require_https || is_loopback(&parsed) => Ok(()),
            _ => Err(FetchError::InsecureUrl(url.to_string())),
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Cache lifetime from `Cache-Control`
///
/// `no-store`/`no-cache` yield zero, `max-age` is capped at
/// [`FetchConfig::max_cache_ttl`], anything else falls back to
/// [`FetchConfig::default_cache_ttl`].
pub fn cache_ttl(headers: &HeaderMap, config: &FetchConfig) -> Duration {
    let Some(value) = headers
        .get(http::header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
    else {
        return config.default_cache_ttl;
    };

    let mut max_age = None;
    for directive in value.split(',').map(str::trim) {
        let lower = directive.to_ascii_lowercase();
        if lower == "no-store" || lower == "no-cache" {
            return Duration::ZERO;
        }
        if let Some(seconds) = lower.strip_prefix("max-age=")
            && let Ok(seconds) = seconds.trim_matches('"').parse::<u64>()
        {
            max_age = Some(Duration::from_secs(seconds));
        }
    }

    max_age.map_or(config.default_cache_ttl, |ttl| ttl.min(config.max_cache_ttl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(cache_control: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CACHE_CONTROL,
            HeaderValue::from_str(cache_control).unwrap(),
        );
        headers
    }

    #[test]
    fn test_cache_ttl_default_without_header() {
        let config = FetchConfig::default();
        assert_eq!(cache_ttl(&HeaderMap::new(), &config), config.default_cache_ttl);
    }

    #[test]
    fn test_cache_ttl_max_age() {
        let config = FetchConfig::default();
        assert_eq!(
            cache_ttl(&headers("public, max-age=120"), &config),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn test_cache_ttl_capped() {
        let config = FetchConfig::default();
        assert_eq!(
            cache_ttl(&headers("max-age=999999999"), &config),
            config.max_cache_ttl
        );
    }

    #[test]
    fn test_cache_ttl_no_store() {
        let config = FetchConfig::default();
        assert_eq!(cache_ttl(&headers("no-store"), &config), Duration::ZERO);
        assert_eq!(
            cache_ttl(&headers("max-age=60, no-cache"), &config),
            Duration::ZERO
        );
    }

    #[test]
    fn test_url_policy() {
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        assert!(fetcher.check_url("https://idp.example.com/keys").is_ok());
        assert!(fetcher.check_url("http://127.0.0.1:8080/keys").is_ok());
        assert!(fetcher.check_url("http://localhost/keys").is_ok());
        assert!(matches!(
            fetcher.check_url("http://idp.example.com/keys"),
            Err(FetchError::InsecureUrl(_))
        ));
        assert!(matches!(
            fetcher.check_url("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_insecure_allowed_when_configured() {
        let config = FetchConfig {
            require_https: false,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(config).unwrap();
        assert!(fetcher.check_url("http://idp.example.com/keys").is_ok());
    }
}
