//! Bearer token verification against an OpenID Provider
//!
//! Order of checks:
//! 1. Structure, algorithm allow-list, `kid` present
//! 2. Expiry (before any network access, so an expired token is rejected as
//!    expired whatever its signature)
//! 3. Issuer metadata and signing keys (one forced JWKS refetch on unknown `kid`)
//! 4. Signature
//! 5. Audience and issuer

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::Value;
use tracing::{debug, warn};

use super::compact::{Claims, decode_token, numeric_date};
use super::jwks::JwksCache;
use crate::config::VerifierConfig;
use crate::discovery::MetadataCache;
use crate::error::{VerificationError, VerificationResult};
use crate::fetch::{FetchError, Fetcher};
use crate::principal::Principal;

/// Cache occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Issuer metadata entries
    pub metadata_entries: usize,
    /// Issuer metadata entries not yet expired
    pub metadata_valid: usize,
    /// JWKS entries
    pub jwks_entries: usize,
    /// JWKS entries not yet expired
    pub jwks_valid: usize,
}

/// Verifies bearer tokens and turns them into [`Principal`]s
///
/// Share one verifier per process (`Arc<TokenVerifier>`); its caches are the
/// point.
///
/// # Example
///
/// ```rust,no_run
/// # use sessiongate_auth::{TokenVerifier, VerifierConfig};
/// # tokio_test::block_on(async {
/// let verifier = TokenVerifier::new(VerifierConfig::default())?;
///
/// let principal = verifier
///     .verify(
///         "eyJ0eXAiOiJKV1QiLCJhbGc...",
///         "ViczvMucBWT14qg3lAM1",
///         "https://example.oktapreview.com/as/ors71yywxk0GfFWmC0h7",
///     )
///     .await?;
///
/// if principal.has_scope("gravatar") {
///     println!("{} may see avatars", principal.subject);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug)]
pub struct TokenVerifier {
    config: VerifierConfig,
    metadata: MetadataCache,
    jwks: JwksCache,
}

impl TokenVerifier {
    /// Create a verifier with empty caches
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(config: VerifierConfig) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        Ok(Self {
            metadata: MetadataCache::new(fetcher.clone()),
            jwks: JwksCache::new(fetcher),
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `token` for `expected_audience` as issued by `expected_issuer`
    ///
    /// # Errors
    ///
    /// Exactly one [`VerificationError`] per rejected token; see the module
    /// docs for the order in which checks run.
    pub async fn verify(
        &self,
        token: &str,
        expected_audience: &str,
        expected_issuer: &str,
    ) -> VerificationResult<Principal> {
        let token = token.trim();
        let decoded =
            decode_token(token).map_err(|e| VerificationError::MalformedToken(e.to_string()))?;

        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode JWT header");
            VerificationError::MalformedToken(format!("invalid header: {e}"))
        })?;

        if !self.config.allowed_algorithms.contains(&header.alg) {
            warn!(algorithm = ?header.alg, "Rejected token algorithm");
            return Err(VerificationError::MalformedToken(format!(
                "algorithm {:?} not allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| VerificationError::MalformedToken("missing kid".to_string()))?;

        self.check_expiry(&decoded.claims)?;

        let metadata_url = self.config.metadata_url_for(expected_issuer);
        let metadata = self
            .metadata
            .get(expected_issuer, &metadata_url)
            .await
            .map_err(|e| {
                warn!(issuer = expected_issuer, error = %e, "Issuer metadata unavailable");
                VerificationError::MetadataUnavailable(e.to_string())
            })?;

        let jwk = self.resolve_key(&metadata.jwks_uri, kid).await?;
        let claims = self.verify_signature(token, header.alg, &jwk)?;

        check_audience(&claims, expected_audience)?;
        check_issuer(&claims, expected_issuer)?;

        let principal = Principal::from_claims(claims);
        debug!(
            subject = %principal.subject,
            scopes = principal.scopes.len(),
            "Token verified"
        );
        Ok(principal)
    }

    fn check_expiry(&self, claims: &Claims) -> VerificationResult<()> {
        let exp = claims
            .get("exp")
            .and_then(numeric_date)
            .ok_or_else(|| VerificationError::MalformedToken("missing or invalid exp".into()))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        if now >= exp.saturating_add(self.config.leeway.as_secs()) {
            debug!(exp, now, "Token expired");
            return Err(VerificationError::TokenExpired);
        }
        Ok(())
    }

    /// Key for `kid`, refetching the key set once when it is not cached
    async fn resolve_key(&self, jwks_uri: &str, kid: &str) -> VerificationResult<Jwk> {
        let unavailable = |e: FetchError| VerificationError::MetadataUnavailable(e.to_string());

        let jwks = self.jwks.get(jwks_uri).await.map_err(unavailable)?;
        if let Some(jwk) = jwks.find(kid) {
            return Ok(jwk.clone());
        }

        debug!(kid, "Key not in cached JWKS, refreshing");
        let jwks = self.jwks.refresh(jwks_uri).await.map_err(unavailable)?;
        jwks.find(kid).cloned().ok_or_else(|| {
            warn!(kid, jwks_uri, "No signing key for kid");
            VerificationError::InvalidSignature(format!("no key with kid {kid}"))
        })
    }

    fn verify_signature(&self, token: &str, alg: Algorithm, jwk: &Jwk) -> VerificationResult<Claims> {
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| VerificationError::InvalidSignature(format!("unusable key: {e}")))?;

        // Time, audience and issuer are checked by hand so each failure keeps
        // its own error variant.
        let mut validation = Validation::new(alg);
        validation.algorithms = vec![alg];
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Signature verification failed");
                VerificationError::InvalidSignature(e.to_string())
            })
    }

    /// Current cache occupancy
    pub fn cache_stats(&self) -> CacheStats {
        let (metadata_entries, metadata_valid) = self.metadata.counts();
        let (jwks_entries, jwks_valid) = self.jwks.counts();
        CacheStats {
            metadata_entries,
            metadata_valid,
            jwks_entries,
            jwks_valid,
        }
    }

    /// Forget all cached metadata and keys
    pub fn clear_caches(&self) {
        self.metadata.clear();
        self.jwks.clear();
    }
}

fn check_audience(claims: &Claims, expected: &str) -> VerificationResult<()> {
    let matches = match claims.get("aud") {
        Some(Value::String(aud)) => aud == expected,
        Some(Value::Array(auds)) => auds.iter().any(|a| a.as_str() == Some(expected)),
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(VerificationError::AudienceMismatch {
            expected: expected.to_string(),
        })
    }
}

fn check_issuer(claims: &Claims, expected: &str) -> VerificationResult<()> {
    let found = claims.get("iss").and_then(Value::as_str).unwrap_or_default();
    if found == expected {
        Ok(())
    } else {
        Err(VerificationError::IssuerMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}
