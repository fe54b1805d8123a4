//! The authenticated caller of a protected route

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jwt::Claims;

/// Identity established from a verified access token
///
/// Built only by [`TokenVerifier::verify`](crate::TokenVerifier::verify);
/// holding one means signature, expiry, audience and issuer all checked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// `sub` claim
    pub subject: String,
    /// Email address, when the token carries one
    pub email: Option<String>,
    /// Granted scopes
    pub scopes: BTreeSet<String>,
    /// Every claim of the verified token
    pub claims: Claims,
}

impl Principal {
    /// Build from verified claims
    pub fn from_claims(claims: Claims) -> Self {
        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let email = ["email", "user_email"]
            .iter()
            .find_map(|name| claims.get(*name).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| subject.contains('@').then(|| subject.clone()));

        let scopes = scopes_from_claims(&claims);

        Self {
            subject,
            email,
            scopes,
            claims,
        }
    }

    /// Whether `scope` was granted
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

/// Scopes from `scp` (array or space-delimited string), falling back to `scope`
pub fn scopes_from_claims(claims: &Claims) -> BTreeSet<String> {
    let raw = claims
        .get("scp")
        .filter(|v| !v.is_null())
        .or_else(|| claims.get("scope"));

    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        _ => BTreeSet::new(),
    }
}
