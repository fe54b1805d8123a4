//! The auth session client
//!
//! One client owns one logical session. Operations are async and may be
//! issued while others are in flight; they act on whatever state exists at
//! the time, so callers serialize dependent operations themselves. The state
//! lock is never held across a provider call.

use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use sessiongate_auth::jwt::{DecodedToken, decode_token};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, SessionError, SessionResult, WidgetError};
use crate::provider::IdentityProvider;
use crate::record::PersistedAuthRecord;
use crate::state::{AuthSession, SessionState};
use crate::store::{KeyValueStore, StorageKey, load_json, save_json};
use crate::types::{
    Ack, AuthRecord, AuthResult, AuthorizeOutcome, AuthorizeRequest, Credentials, ResponseType,
    SessionLookup, SessionObject, SessionPresence, TokenRequest, TokenSet, Transaction,
};
use crate::widget::SignInWidget;

/// Client-side session state machine over an identity provider and a store
///
/// # Example
///
/// ```rust,no_run
/// use sessiongate_session::{
///     AuthSessionClient, ClientConfig, Credentials, MemoryStore, OktaProvider, TokenRequest,
/// };
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OktaProvider::new(ClientConfig::default())?;
/// let client = AuthSessionClient::new(provider, MemoryStore::new());
///
/// let auth = client.sign_in(&Credentials::new("alice@example.com", "secret")).await?;
/// let tokens = client
///     .issue_tokens(&TokenRequest::new(
///         auth.session_token,
///         ["id_token", "token"],
///         ["openid", "email"],
///     ))
///     .await?;
/// println!("access token: {:?}", tokens.access_token);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuthSessionClient<P, S> {
    provider: P,
    store: S,
    session: Mutex<AuthSession>,
}

impl<P, S> AuthSessionClient<P, S>
where
    P: IdentityProvider,
    S: KeyValueStore,
{
    /// Client in state `NoSession`
    pub fn new(provider: P, store: S) -> Self {
        Self {
            provider,
            store,
            session: Mutex::new(AuthSession::default()),
        }
    }

    /// The identity provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The persisted store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.session.lock().state
    }

    /// Copy of the in-memory session
    pub fn snapshot(&self) -> AuthSession {
        self.session.lock().clone()
    }

    /// Everything currently persisted
    ///
    /// # Errors
    ///
    /// [`SessionError::Storage`] for unreadable or corrupt values.
    pub fn persisted(&self) -> SessionResult<PersistedAuthRecord> {
        Ok(PersistedAuthRecord::load(&self.store)?)
    }

    /// `Authenticated` becomes `Expired`; other states have no session to lose
    fn expire_established(&self) {
        let mut session = self.session.lock();
        if session.state == SessionState::Authenticated {
            info!("Provider no longer has the session");
            session.state = SessionState::Expired;
        }
    }

    fn transition(&self, to: SessionState) {
        let mut session = self.session.lock();
        if session.state != to {
            debug!(from = %session.state, to = %to, "Session state change");
            session.state = to;
        }
    }

    /// Ask the provider whether a session is live
    ///
    /// A live session moves `NoSession`, `Expired` and `SignedOut` to
    /// `Authenticated`. No session is a normal [`SessionPresence::Absent`];
    /// if the client believed it was authenticated, it moves to `Expired`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Provider`] when the provider cannot be asked.
    pub async fn check_existing_session(&self) -> SessionResult<SessionPresence> {
        match self.provider.get_session().await? {
            SessionLookup::Established(object) => {
                let mut session = self.session.lock();
                if session.state.can_resume() {
                    debug!(from = %session.state, "Resuming live provider session");
                    session.state = SessionState::Authenticated;
                }
                Ok(SessionPresence::Present(object))
            }
            SessionLookup::Absent => {
                self.expire_established();
                Ok(SessionPresence::Absent)
            }
        }
    }

    /// Primary authentication
    ///
    /// On `SUCCESS` persists `auth` and `session = true` and moves to
    /// `Authenticated`. Every other outcome leaves the client in `NoSession`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::UnhandledTransactionState`] for any status other
    ///   than `SUCCESS` (MFA, password expiry, ...)
    /// - [`SessionError::Provider`] for rejected credentials or transport
    ///   failures
    pub async fn sign_in(&self, credentials: &Credentials) -> SessionResult<AuthResult> {
        self.transition(SessionState::Authenticating);

        let transaction = match self.provider.authenticate(credentials).await {
            Ok(transaction) => transaction,
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Sign-in failed");
                self.transition(SessionState::NoSession);
                return Err(e.into());
            }
        };

        self.complete_sign_in(&credentials.username, transaction)
    }

    fn complete_sign_in(&self, user: &str, transaction: Transaction) -> SessionResult<AuthResult> {
        if !transaction.is_success() {
            warn!(status = %transaction.status, "Unhandled transaction status");
            self.transition(SessionState::NoSession);
            return Err(SessionError::UnhandledTransactionState {
                status: transaction.status,
            });
        }

        let Some(session_token) = transaction.session_token.clone() else {
            self.transition(SessionState::NoSession);
            return Err(ProviderError::Protocol(
                "SUCCESS transaction without sessionToken".to_string(),
            )
            .into());
        };

        let auth = AuthRecord {
            user: user.to_string(),
            transaction,
        };

        if let Err(e) = save_json(&self.store, StorageKey::Auth, &auth)
            .and_then(|()| save_json(&self.store, StorageKey::Session, &true))
        {
            self.transition(SessionState::NoSession);
            return Err(e.into());
        }

        {
            let mut session = self.session.lock();
            session.session_token = Some(session_token.clone());
            session.state = SessionState::Authenticated;
        }
        info!(user, "Signed in");

        Ok(AuthResult {
            auth,
            session: true,
            session_token,
        })
    }

    /// Exchange a live session for tokens
    ///
    /// Claims are decoded from the ID token when one is issued; the result is
    /// persisted as `userInfo`. The session expiry comes from the ID token's
    /// `exp`, else from the access token's `expires_in`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidRequest`] for an empty or unknown response
    ///   type
    /// - [`SessionError::SessionInvalid`] outside `Authenticated`, or when the
    ///   provider needs an interactive login
    pub async fn issue_tokens(&self, request: &TokenRequest) -> SessionResult<TokenSet> {
        let response_types = request.parsed_response_types()?;

        if self.state() != SessionState::Authenticated {
            return Err(SessionError::SessionInvalid);
        }

        let outcome = self
            .provider
            .authorize(&AuthorizeRequest {
                session_token: request.session_token.clone(),
                response_types,
                scopes: request.scopes.clone(),
            })
            .await?;

        let AuthorizeOutcome::Issued(issued) = outcome else {
            warn!("Provider requires login to issue tokens");
            return Err(SessionError::SessionInvalid);
        };

        let decoded = issued.id_token.as_deref().map(decode_token).transpose()?;
        let tokens = TokenSet {
            id_token: issued.id_token,
            access_token: issued.access_token,
            claims: decoded.as_ref().map(|d| d.claims.clone()),
        };

        save_json(&self.store, StorageKey::UserInfo, &tokens)?;
        {
            let mut session = self.session.lock();
            session.id_token = tokens.id_token.clone();
            session.access_token = tokens.access_token.clone();
            session.claims = tokens.claims.clone();
            session.expires_at = match &decoded {
                Some(decoded) => decoded.expires_at(),
                None => issued
                    .expires_in
                    .and_then(|secs| SystemTime::now().checked_add(Duration::from_secs(secs))),
            };
        }
        info!(
            id_token = tokens.id_token.is_some(),
            access_token = tokens.access_token.is_some(),
            "Tokens issued"
        );
        Ok(tokens)
    }

    /// Obtain a fresh ID token for the live session
    ///
    /// Access tokens are not renewable here: the previously held access
    /// token (in memory, else from persisted `userInfo`) is carried over
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NoActiveSession`] outside `Authenticated`
    /// - [`SessionError::SessionExpired`] when the provider session is gone;
    ///   the client moves to `Expired`
    pub async fn renew_id_token(&self, scopes: &[String]) -> SessionResult<TokenSet> {
        {
            let mut session = self.session.lock();
            if session.state != SessionState::Authenticated {
                return Err(SessionError::NoActiveSession);
            }
            session.state = SessionState::Renewing;
        }

        let outcome = self
            .provider
            .authorize(&AuthorizeRequest {
                session_token: None,
                response_types: vec![ResponseType::IdToken],
                scopes: scopes.to_vec(),
            })
            .await;

        let issued = match outcome {
            Ok(AuthorizeOutcome::Issued(issued)) => issued,
            Ok(AuthorizeOutcome::LoginRequired) => {
                info!("Session expired during ID token renewal");
                self.transition(SessionState::Expired);
                return Err(SessionError::SessionExpired);
            }
            Err(e) => {
                self.transition(SessionState::Authenticated);
                return Err(e.into());
            }
        };

        match self.finish_renewal(issued.id_token) {
            Ok(tokens) => {
                self.transition(SessionState::Authenticated);
                Ok(tokens)
            }
            Err(e) => {
                self.transition(SessionState::Authenticated);
                Err(e)
            }
        }
    }

    fn finish_renewal(&self, id_token: Option<String>) -> SessionResult<TokenSet> {
        let id_token = id_token.ok_or_else(|| {
            ProviderError::Protocol("renewal response without id_token".to_string())
        })?;
        let decoded = decode_token(&id_token)?;

        let cached = self.session.lock().access_token.clone();
        let access_token = match cached {
            Some(token) => Some(token),
            None => load_json::<TokenSet, _>(&self.store, StorageKey::UserInfo)?
                .and_then(|info| info.access_token),
        };

        let tokens = TokenSet {
            id_token: Some(id_token),
            access_token,
            claims: Some(decoded.claims.clone()),
        };
        save_json(&self.store, StorageKey::UserInfo, &tokens)?;

        let mut session = self.session.lock();
        session.id_token = tokens.id_token.clone();
        session.access_token = tokens.access_token.clone();
        session.claims = tokens.claims.clone();
        session.expires_at = decoded.expires_at();
        debug!("ID token renewed");
        Ok(tokens)
    }

    /// Decode a token locally and persist it as `decodedIdToken`
    ///
    /// # Errors
    ///
    /// [`SessionError::Decode`] for a malformed token.
    pub fn decode_token(&self, token: &str) -> SessionResult<DecodedToken> {
        let decoded = decode_token(token)?;
        save_json(&self.store, StorageKey::DecodedIdToken, &decoded)?;
        Ok(decoded)
    }

    /// Extend the provider session
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionExpired`] if the provider has no session,
    /// before or during the refresh. An `Authenticated` client moves to
    /// `Expired`; other states are left alone.
    pub async fn refresh_session(&self) -> SessionResult<SessionObject> {
        if let SessionLookup::Absent = self.provider.get_session().await? {
            self.expire_established();
            return Err(SessionError::SessionExpired);
        }

        match self.provider.refresh_session().await? {
            SessionLookup::Established(object) => {
                save_json(&self.store, StorageKey::SessionObject, &object)?;
                {
                    let mut session = self.session.lock();
                    if session.state.can_resume() {
                        session.state = SessionState::Authenticated;
                    }
                }
                info!(session_id = %object.id, "Session refreshed");
                Ok(object)
            }
            SessionLookup::Absent => {
                self.expire_established();
                Err(SessionError::SessionExpired)
            }
        }
    }

    /// Close the provider session
    ///
    /// Closing a session that is already gone still succeeds. Persists
    /// `session = false` and moves to `NoSession`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Provider`] for transport failures.
    pub async fn close_session(&self) -> SessionResult<Ack> {
        self.provider.close_session().await?;
        save_json(&self.store, StorageKey::Session, &false)?;

        let mut session = self.session.lock();
        session.session_token = None;
        session.state = SessionState::NoSession;
        info!("Session closed");
        Ok(Ack::SessionClosed)
    }

    /// Sign out
    ///
    /// Without a provider session this is [`Ack::AlreadySignedOut`], not an
    /// error. Either way persisted storage and the in-memory session are
    /// cleared and the client moves to `SignedOut`.
    ///
    /// # Errors
    ///
    /// [`SessionError::Provider`] if the provider cannot be reached.
    pub async fn sign_out(&self) -> SessionResult<Ack> {
        let ack = match self.provider.get_session().await? {
            SessionLookup::Established(_) => {
                self.provider.sign_out().await?;
                Ack::SignedOut
            }
            SessionLookup::Absent => Ack::AlreadySignedOut,
        };

        self.store.clear()?;
        {
            let mut session = self.session.lock();
            session.clear_credentials();
            session.state = SessionState::SignedOut;
        }
        info!(result = %ack, "Signed out");
        Ok(ack)
    }

    /// Run a sign-in widget to completion
    ///
    /// A `SUCCESS` transaction completes like [`sign_in`](Self::sign_in).
    /// A [`WidgetError::TransientRender`] triggers exactly one reload and
    /// second render.
    ///
    /// # Errors
    ///
    /// - [`SessionError::WidgetRejected`] for any other terminal status
    /// - [`SessionError::WidgetRenderFailed`] when rendering fails after the
    ///   reload, or for non-transient failures
    pub async fn launch_widget<W>(&self, widget: &mut W) -> SessionResult<AuthResult>
    where
        W: SignInWidget + ?Sized,
    {
        self.transition(SessionState::Authenticating);

        let mut reloaded = false;
        let outcome = loop {
            match widget.render().await {
                Ok(outcome) => break outcome,
                Err(WidgetError::TransientRender(reason)) if !reloaded => {
                    warn!(%reason, "Widget failed to render, reloading once");
                    reloaded = true;
                    if let Err(e) = widget.reload().await {
                        self.transition(SessionState::NoSession);
                        return Err(SessionError::WidgetRenderFailed(e.to_string()));
                    }
                }
                Err(e) => {
                    warn!(error = %e, reloaded, "Widget failed");
                    self.transition(SessionState::NoSession);
                    return Err(SessionError::WidgetRenderFailed(e.to_string()));
                }
            }
        };

        if !outcome.transaction.is_success() {
            self.transition(SessionState::NoSession);
            return Err(SessionError::WidgetRejected {
                status: outcome.transaction.status,
            });
        }

        self.complete_sign_in(&outcome.user, outcome.transaction)
    }

    /// Persist the resource server's avatar answer
    ///
    /// # Errors
    ///
    /// [`SessionError::Storage`] on write failure.
    pub fn save_profile_image(&self, image: &str, name: &str) -> SessionResult<()> {
        save_json(&self.store, StorageKey::Image, image)?;
        save_json(&self.store, StorageKey::ImageName, name)?;
        Ok(())
    }

    /// Access token to present to resource servers
    pub fn access_token(&self) -> Option<String> {
        self.session.lock().access_token.clone()
    }

    /// Seed in-memory tokens from persisted `userInfo`
    ///
    /// Used by front-ends that reopen a store across process runs. Returns
    /// whether anything was restored.
    ///
    /// # Errors
    ///
    /// [`SessionError::Storage`] for a corrupt `userInfo`.
    pub fn restore_tokens(&self) -> SessionResult<bool> {
        let Some(info) = load_json::<TokenSet, _>(&self.store, StorageKey::UserInfo)? else {
            return Ok(false);
        };
        let expires_at: Option<SystemTime> = info
            .id_token
            .as_deref()
            .and_then(|t| decode_token(t).ok())
            .and_then(|d| d.expires_at());

        let mut session = self.session.lock();
        session.id_token = info.id_token;
        session.access_token = info.access_token;
        session.claims = info.claims;
        session.expires_at = expires_at;
        Ok(true)
    }
}
