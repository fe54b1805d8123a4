//! # Identity Provider Boundary
//!
//! Everything the session client needs from the network sits behind
//! [`IdentityProvider`]. Responses are tagged unions ([`SessionLookup`],
//! [`AuthorizeOutcome`]) so "no session" is a value, not an error.
//!
//! [`OktaProvider`] talks to an Okta-style org over HTTP; tests substitute
//! scripted fakes.

mod okta;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{AuthorizeOutcome, AuthorizeRequest, Credentials, SessionLookup, Transaction};

pub use okta::OktaProvider;

/// Network operations of an identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the current provider session
    async fn get_session(&self) -> Result<SessionLookup, ProviderError>;

    /// Primary authentication with username and password
    async fn authenticate(&self, credentials: &Credentials) -> Result<Transaction, ProviderError>;

    /// Request tokens without user interaction
    async fn authorize(&self, request: &AuthorizeRequest)
    -> Result<AuthorizeOutcome, ProviderError>;

    /// Extend the current provider session
    async fn refresh_session(&self) -> Result<SessionLookup, ProviderError>;

    /// Close the current provider session; closing nothing succeeds
    async fn close_session(&self) -> Result<(), ProviderError>;

    /// Terminate the user's session at the provider
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    async fn get_session(&self) -> Result<SessionLookup, ProviderError> {
        (**self).get_session().await
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Transaction, ProviderError> {
        (**self).authenticate(credentials).await
    }

    async fn authorize(
        &self,
        request: &AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, ProviderError> {
        (**self).authorize(request).await
    }

    async fn refresh_session(&self) -> Result<SessionLookup, ProviderError> {
        (**self).refresh_session().await
    }

    async fn close_session(&self) -> Result<(), ProviderError> {
        (**self).close_session().await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        (**self).sign_out().await
    }
}
