//! Compact JWS parsing without verification
//!
//! Splits `header.payload.signature`, base64url-decodes the first two
//! segments and parses them as JSON objects. No keys, no network. The
//! verifier uses this as its structural check; the session client exposes it
//! as `decode_token`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// URL-safe base64 that accepts segments with or without padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// JSON object type used for headers and claims
pub type Claims = Map<String, Value>;

/// Decoding failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Not three base64url segments of JSON
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

/// The three parts of a compact token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedToken {
    /// JOSE header
    pub header: Claims,
    /// Payload claims
    #[serde(alias = "payload")]
    pub claims: Claims,
    /// Signature segment, still base64url-encoded
    pub signature: String,
}

impl DecodedToken {
    /// String claim by name
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// `kid` header parameter
    pub fn key_id(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }

    /// `exp` as a point in time, if present, numeric and representable
    pub fn expires_at(&self) -> Option<SystemTime> {
        let secs = numeric_date(self.claims.get("exp")?)?;
        UNIX_EPOCH.checked_add(Duration::from_secs(secs))
    }
}

/// Interpret a NumericDate claim (integer or float seconds since the epoch)
pub(crate) fn numeric_date(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

/// Split and decode a compact token
///
/// # Errors
///
/// Returns [`DecodeError::MalformedToken`] when the token does not have three
/// segments, a segment is not base64url, or header/payload are not JSON
/// objects.
///
/// # Example
///
/// ```rust
/// use sessiongate_auth::jwt::decode_token;
///
/// // {"alg":"RS256","kid":"k1"} . {"sub":"alice"} . sig
/// let token = "eyJhbGciOiJSUzI1NiIsImtpZCI6ImsxIn0.eyJzdWIiOiJhbGljZSJ9.c2ln";
/// let decoded = decode_token(token).unwrap();
/// assert_eq!(decoded.claim_str("sub"), Some("alice"));
/// assert_eq!(decoded.key_id(), Some("k1"));
/// ```
pub fn decode_token(token: &str) -> Result<DecodedToken, DecodeError> {
    let mut segments = token.trim().split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(DecodeError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    if URL_SAFE_LENIENT.decode(signature).is_err() {
        return Err(DecodeError::MalformedToken(
            "signature is not base64url".to_string(),
        ));
    }

    Ok(DecodedToken {
        header: decode_segment(header, "header")?,
        claims: decode_segment(payload, "payload")?,
        signature: signature.to_string(),
    })
}

fn decode_segment(segment: &str, name: &str) -> Result<Claims, DecodeError> {
    if segment.is_empty() {
        return Err(DecodeError::MalformedToken(format!("{name} is empty")));
    }

    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .map_err(|e| DecodeError::MalformedToken(format!("{name} is not base64url: {e}")))?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DecodeError::MalformedToken(format!(
            "{name} is not a JSON object"
        ))),
        Err(e) => Err(DecodeError::MalformedToken(format!(
            "{name} is not JSON: {e}"
        ))),
    }
}
