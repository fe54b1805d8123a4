//! # Token Verification
//!
//! - [`decode_token`]: structural decoding, no trust implied
//! - [`JwksCache`]: signing keys per JWKS URI
//! - [`TokenVerifier`]: the full check (signature, `exp`, `aud`, `iss`)
//!
//! ## Supported Algorithms
//!
//! - **RS256/RS384/RS512**: RSA PKCS#1 v1.5 with SHA-2
//! - **PS256**: RSA-PSS with SHA-256
//! - **ES256**: ECDSA P-256 with SHA-256
//!
//! `none` and HMAC algorithms are never accepted for bearer tokens.

pub mod compact;
pub mod jwks;
pub mod validator;

pub use compact::{Claims, DecodeError, DecodedToken, decode_token};
pub use jwks::JwksCache;
pub use validator::{CacheStats, TokenVerifier};
