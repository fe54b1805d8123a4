//! Error types for the session client
//!
//! "No session" and "already signed out" are outcomes, not errors; see
//! [`SessionPresence`](crate::SessionPresence) and [`Ack`](crate::Ack).

use sessiongate_auth::jwt::DecodeError;
use thiserror::Error;

/// Failure of an [`AuthSessionClient`](crate::AuthSessionClient) operation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Token issuance needs a live provider session
    #[error("no live session to issue tokens from")]
    SessionInvalid,

    /// The operation needs the `Authenticated` state
    #[error("no active session")]
    NoActiveSession,

    /// The provider reports the session as gone
    #[error("session expired")]
    SessionExpired,

    /// Sign-in ended in a transaction status other than `SUCCESS`
    #[error("cannot handle the {status} status")]
    UnhandledTransactionState {
        /// Raw transaction status from the provider
        status: String,
    },

    /// Token could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request itself is unusable
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The sign-in widget finished without success
    #[error("sign-in widget finished with status {status}")]
    WidgetRejected {
        /// Terminal widget status
        status: String,
    },

    /// The widget failed to render after its one reload
    #[error("sign-in widget failed to render: {0}")]
    WidgetRenderFailed(String),

    /// Identity provider failure
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Persisted storage failure
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Failure talking to the identity provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    /// The provider refused the request (bad credentials, revoked client)
    #[error("rejected by identity provider: {0}")]
    Rejected(String),

    /// Network or TLS failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Unexpected HTTP status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response did not follow the protocol
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Authorization endpoint returned an OAuth error other than `login_required`
    #[error("authorization error {error}: {description}")]
    Authorization {
        /// OAuth `error` code
        error: String,
        /// `error_description`, empty when absent
        description: String,
    },
}

/// Failure of the persisted key-value store
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A stored value does not parse as the expected JSON
    #[error("corrupt value under key {key}")]
    Corrupt {
        /// Storage key
        key: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be serialized
    #[error("failed to serialize value for key {key}")]
    Serialize {
        /// Storage key
        key: String,
        /// Serialization failure
        #[source]
        source: serde_json::Error,
    },

    /// Backing file could not be read or written
    #[error("storage I/O error at {path}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a sign-in widget render
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum WidgetError {
    /// Known provider-side glitch; cured by a full reload
    #[error("transient render failure: {0}")]
    TransientRender(String),

    /// Any other failure
    #[error("widget failure: {0}")]
    Failed(String),
}
