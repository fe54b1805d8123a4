//! Values exchanged with the identity provider and returned to callers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Username and password for the primary authentication API
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name, usually an email address
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Build credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication transaction returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// `SUCCESS`, `MFA_REQUIRED`, `PASSWORD_EXPIRED`, ...
    pub status: String,
    /// One-time token exchangeable for a session; present on `SUCCESS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Transaction expiry as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Everything else (`_embedded`, `_links`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Status that completes primary authentication
    pub const SUCCESS: &'static str = "SUCCESS";

    /// Whether the transaction completed
    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

/// Provider-side session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionObject {
    /// Session id
    pub id: String,
    /// Owning user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Login name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// Session expiry as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// `ACTIVE`, `MFA_REQUIRED`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Everything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Answer of a provider session lookup
#[derive(Debug, Clone, PartialEq)]
pub enum SessionLookup {
    /// A live session exists
    Established(SessionObject),
    /// No session (never created, closed, or expired)
    Absent,
}

/// Outcome of [`check_existing_session`](crate::AuthSessionClient::check_existing_session)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPresence {
    /// The provider has a live session
    Present(SessionObject),
    /// No session; a normal result
    Absent,
}

impl SessionPresence {
    /// Whether a session exists
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Token kinds the authorization endpoint can return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResponseType {
    /// OpenID Connect ID token
    #[serde(rename = "id_token")]
    IdToken,
    /// OAuth access token
    #[serde(rename = "token")]
    Token,
}

impl ResponseType {
    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdToken => "id_token",
            Self::Token => "token",
        }
    }
}

impl FromStr for ResponseType {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id_token" => Ok(Self::IdToken),
            "token" | "access_token" => Ok(Self::Token),
            other => Err(SessionError::InvalidRequest(format!(
                "unknown response type {other:?}"
            ))),
        }
    }
}

/// Caller's token request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Session token from sign-in; `None` reuses the provider session cookie
    pub session_token: Option<String>,
    /// Requested response types; must be a non-empty subset of
    /// `{id_token, token}`
    pub response_types: Vec<String>,
    /// Requested scopes
    pub scopes: Vec<String>,
}

impl TokenRequest {
    /// Request with an explicit session token
    pub fn new<R, S>(session_token: impl Into<String>, response_types: R, scopes: S) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            session_token: Some(session_token.into()),
            response_types: response_types.into_iter().map(Into::into).collect(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Validated, de-duplicated response types in wire order
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidRequest`] on an empty list or unknown entry.
    pub fn parsed_response_types(&self) -> Result<Vec<ResponseType>, SessionError> {
        if self.response_types.is_empty() {
            return Err(SessionError::InvalidRequest(
                "at least one response type is required".to_string(),
            ));
        }
        let mut parsed = self
            .response_types
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<ResponseType>, _>>()?;
        parsed.sort();
        parsed.dedup();
        Ok(parsed)
    }
}

/// Parameters for one authorization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    /// Session token to exchange, if any
    pub session_token: Option<String>,
    /// Response types, validated
    pub response_types: Vec<ResponseType>,
    /// Scopes
    pub scopes: Vec<String>,
}

/// Tokens delivered by the authorization endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IssuedTokens {
    /// ID token, when requested
    pub id_token: Option<String>,
    /// Access token, when requested
    pub access_token: Option<String>,
    /// Access token lifetime in seconds
    pub expires_in: Option<u64>,
}

/// Answer of an authorization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    /// The provider issued tokens
    Issued(IssuedTokens),
    /// No live session; interactive login would be needed
    LoginRequired,
}

/// Tokens held by the client, persisted as `userInfo`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    /// ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Claims of the ID token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Map<String, Value>>,
}

/// Persisted sign-in details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    /// Login name used
    pub user: String,
    /// Completed transaction
    pub transaction: Transaction,
}

/// Result of a successful sign-in
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResult {
    /// Persisted sign-in details
    pub auth: AuthRecord,
    /// Always `true`
    pub session: bool,
    /// One-time token for [`issue_tokens`](crate::AuthSessionClient::issue_tokens)
    pub session_token: String,
}

/// Acknowledgement of a session-ending operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// The provider session is closed (or already was)
    SessionClosed,
    /// A live session was terminated
    SignedOut,
    /// There was nothing to sign out of
    AlreadySignedOut,
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SessionClosed => "Closed Session",
            Self::SignedOut => "Signed out",
            Self::AlreadySignedOut => "Already Signed Out",
        })
    }
}
