//! OpenID Provider metadata document

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// OpenID Connect Discovery 1.0 provider metadata
///
/// Only `issuer` and `jwks_uri` are required here; the document is an
/// externally versioned contract, so every other field is optional and
/// unrecognised fields land in `additional_fields`.
///
/// ```json
/// {
///   "issuer": "https://example.oktapreview.com",
///   "authorization_endpoint": "https://example.oktapreview.com/oauth2/v1/authorize",
///   "token_endpoint": "https://example.oktapreview.com/oauth2/v1/token",
///   "jwks_uri": "https://example.oktapreview.com/oauth2/v1/keys",
///   "response_types_supported": ["code", "id_token", "token id_token"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuerMetadata {
    /// Issuer identifier
    pub issuer: String,

    /// URL of the JWK Set document
    pub jwks_uri: String,

    /// Authorization endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,

    /// Token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,

    /// UserInfo endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,

    /// RP-initiated logout endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,

    /// Token introspection endpoint (RFC 7662)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introspection_endpoint: Option<String>,

    /// Token revocation endpoint (RFC 7009)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_endpoint: Option<String>,

    /// Supported scope values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes_supported: Option<Vec<String>>,

    /// Supported `response_type` values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_types_supported: Option<Vec<String>>,

    /// JWS algorithms used for ID tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_signing_alg_values_supported: Option<Vec<String>>,

    /// Everything else the provider publishes
    #[serde(flatten)]
    pub additional_fields: HashMap<String, serde_json::Value>,
}
