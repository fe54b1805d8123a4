//! HTTP responses for rejected requests

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode, header};
use serde_json::json;

use crate::error::VerificationError;

/// Why the middleware refused a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization: Bearer` header
    MissingToken {
        /// Realm for the challenge
        realm: String,
    },
    /// The token failed verification
    Invalid {
        /// Realm for the challenge
        realm: String,
        /// The failed check
        error: VerificationError,
    },
}

impl AuthRejection {
    /// Status code the rejection maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Invalid { error, .. } if error.is_upstream() => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingToken { .. } => "missing bearer token".to_string(),
            Self::Invalid { error, .. } => error.to_string(),
        }
    }

    fn challenge(&self) -> HeaderValue {
        let value = match self {
            Self::MissingToken { realm } => format!("Bearer realm=\"{}\"", quoted(realm)),
            Self::Invalid { realm, error } => format!(
                "Bearer realm=\"{}\", error=\"invalid_token\", error_description=\"{}\"",
                quoted(realm),
                quoted(&error.to_string())
            ),
        };
        HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("Bearer"))
    }
}

/// Make `s` safe inside a quoted-string
fn quoted(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .map(|c| if c == '"' || c == '\\' { '\'' } else { c })
        .collect()
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.message() }));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, self.challenge())], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
