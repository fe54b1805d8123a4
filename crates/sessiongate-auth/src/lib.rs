//! # Sessiongate Auth - OIDC Bearer Token Verification
//!
//! Verifies access tokens issued by an OpenID Provider and turns them into a
//! [`Principal`] carrying the granted scopes.
//!
//! ## Key Features
//!
//! - **Discovery** - Issuer metadata from `/.well-known/openid-configuration`
//! - **JWKS caching** - `Cache-Control` aware, with one forced refetch when a
//!   token names an unknown key
//! - **Strict checks** - signature, `exp`, `aud`, `iss`, algorithm allow-list
//! - **Tower middleware** - [`tower::BearerAuthLayer`] for axum routers
//!   (`middleware` feature, on by default)
//!
//! ## Architecture
//!
//! - [`config`] - Verifier and fetch limits
//! - [`fetch`] - Hardened HTTP GET with cache TTL extraction
//! - [`discovery`] - Issuer metadata and its cache
//! - [`jwt`] - Token decoding, key cache, verifier
//! - [`principal`] - The authenticated caller
//! - [`tower`] - Bearer middleware
//!
//! ## Quick Start
//!
//! ```rust
//! use sessiongate_auth::jwt::decode_token;
//!
//! let decoded = decode_token(
//!     "eyJhbGciOiJSUzI1NiIsImtpZCI6ImsxIn0.eyJzdWIiOiJhbGljZSJ9.c2ln",
//! )?;
//! assert_eq!(decoded.claim_str("sub"), Some("alice"));
//! # Ok::<(), sessiongate_auth::jwt::DecodeError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod jwt;
pub mod principal;

#[cfg(feature = "middleware")]
pub mod tower;

pub use config::{FetchConfig, VerifierConfig};
pub use error::{VerificationError, VerificationResult};
pub use jwt::{CacheStats, DecodedToken, TokenVerifier, decode_token};
pub use principal::Principal;

/// Algorithm type used in [`VerifierConfig::allowed_algorithms`]
pub use jsonwebtoken::Algorithm;
