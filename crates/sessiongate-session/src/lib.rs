//! # Sessiongate Session - Client-Side Auth Session State Machine
//!
//! Drives sign-in, token issuance, ID-token renewal, session refresh,
//! session close and sign-out against an OpenID Provider, persisting what it
//! learns in an injected key-value store.
//!
//! ## Architecture
//!
//! - [`client`] - [`AuthSessionClient`], the state machine
//! - [`provider`] - [`IdentityProvider`] seam and the Okta HTTP implementation
//! - [`store`] - [`KeyValueStore`] with memory and file backends
//! - [`widget`] - [`SignInWidget`] seam and its bounded retry
//! - [`state`] - [`SessionState`] and the in-memory [`AuthSession`]
//!
//! ## States
//!
//! ```text
//! NoSession -> Authenticating -> Authenticated -> Renewing -> Authenticated
//!                                                          \-> Expired
//! Authenticated -> SignedOut
//! ```
//!
//! "No session" and "already signed out" are ordinary results
//! ([`SessionPresence::Absent`], [`Ack::AlreadySignedOut`]), never errors.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod record;
pub mod state;
pub mod store;
pub mod types;
pub mod widget;

pub use client::AuthSessionClient;
pub use config::ClientConfig;
pub use error::{ProviderError, SessionError, SessionResult, StoreError, WidgetError};
pub use provider::{IdentityProvider, OktaProvider};
pub use record::PersistedAuthRecord;
pub use state::{AuthSession, SessionState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageKey};
pub use types::{
    Ack, AuthRecord, AuthResult, AuthorizeOutcome, AuthorizeRequest, Credentials, IssuedTokens,
    ResponseType, SessionLookup, SessionObject, SessionPresence, TokenRequest, TokenSet,
    Transaction,
};
pub use widget::{CredentialWidget, SignInWidget, WidgetOutcome};

pub use sessiongate_auth::{DecodedToken, decode_token};
