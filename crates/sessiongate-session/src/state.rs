//! Session states and the in-memory session

use std::fmt;
use std::time::SystemTime;

use serde_json::{Map, Value};

/// Where the client is in its lifecycle
///
/// ```text
/// NoSession -> Authenticating -> Authenticated -> Renewing -> Authenticated
///                                      |               \--> Expired
///                                      \--> SignedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Nothing established
    #[default]
    NoSession,
    /// Sign-in in flight
    Authenticating,
    /// Live provider session
    Authenticated,
    /// ID token renewal in flight
    Renewing,
    /// The provider dropped the session
    Expired,
    /// The user signed out
    SignedOut,
}

impl SessionState {
    /// Whether an established session can be (re)entered from here by
    /// discovering a live provider session
    pub fn can_resume(self) -> bool {
        matches!(self, Self::NoSession | Self::Expired | Self::SignedOut)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoSession => "no session",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Renewing => "renewing",
            Self::Expired => "expired",
            Self::SignedOut => "signed out",
        })
    }
}

/// In-memory session owned by the client
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthSession {
    /// Lifecycle state
    pub state: SessionState,
    /// One-time token from the last successful sign-in
    pub session_token: Option<String>,
    /// Current ID token
    pub id_token: Option<String>,
    /// Current access token
    pub access_token: Option<String>,
    /// Claims of the current ID token
    pub claims: Option<Map<String, Value>>,
    /// Expiry of the current ID token, else of the access token
    pub expires_at: Option<SystemTime>,
}

impl AuthSession {
    /// Forget tokens and the session token, keep the state
    pub(crate) fn clear_credentials(&mut self) {
        self.session_token = None;
        self.id_token = None;
        self.access_token = None;
        self.claims = None;
        self.expires_at = None;
    }
}
