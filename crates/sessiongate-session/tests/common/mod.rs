//! Scripted identity provider and widget for client tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use sessiongate_session::{
    AuthSessionClient, AuthorizeOutcome, AuthorizeRequest, Credentials, IdentityProvider,
    IssuedTokens, MemoryStore, ProviderError, ResponseType, SessionLookup, SessionObject,
    SignInWidget, Transaction, WidgetError, WidgetOutcome,
};

pub type TestClient = AuthSessionClient<Arc<ScriptedProvider>, MemoryStore>;

/// Client over a fresh provider and memory store
pub fn client() -> (TestClient, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::default());
    (
        AuthSessionClient::new(Arc::clone(&provider), MemoryStore::new()),
        provider,
    )
}

pub fn transaction(status: &str, session_token: Option<&str>) -> Transaction {
    Transaction {
        status: status.to_string(),
        session_token: session_token.map(str::to_string),
        expires_at: None,
        extra: Map::new(),
    }
}

pub fn session_object(id: &str) -> SessionObject {
    SessionObject {
        id: id.to_string(),
        user_id: Some("00u1abcd".into()),
        login: Some("alice@example.com".into()),
        expires_at: Some("2026-10-16T14:00:00.000Z".into()),
        status: Some("ACTIVE".into()),
        extra: Map::new(),
    }
}

/// Unsigned-for-our-purposes ID token with a distinct `jti`, valid for an hour
pub fn id_token(serial: usize) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    id_token_expiring(serial, json!(exp))
}

/// ID token with an arbitrary `exp` claim
pub fn id_token_expiring(serial: usize, exp: Value) -> String {
    encode(
        &Header::default(),
        &json!({
            "sub": "00u1abcd",
            "email": "alice@example.com",
            "jti": format!("ID.{serial}"),
            "exp": exp
        }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

/// In-memory provider with a scriptable session and sign-in answers
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pub live_session: Mutex<Option<SessionObject>>,
    pub authn_answers: Mutex<VecDeque<Result<Transaction, ProviderError>>>,
    pub authorize_requests: Mutex<Vec<AuthorizeRequest>>,
    pub fail_close: Mutex<Option<ProviderError>>,
    /// `exp` put in issued ID tokens instead of an hour from now
    pub id_token_exp: Mutex<Option<Value>>,
    pub issued: AtomicUsize,
    pub closes: AtomicUsize,
    pub sign_outs: AtomicUsize,
}

impl ScriptedProvider {
    pub fn with_live_session(&self) {
        *self.live_session.lock() = Some(session_object("102sess"));
    }

    pub fn drop_session(&self) {
        *self.live_session.lock() = None;
    }

    pub fn answer_authn(&self, answer: Result<Transaction, ProviderError>) {
        self.authn_answers.lock().push_back(answer);
    }

    pub fn has_session(&self) -> bool {
        self.live_session.lock().is_some()
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn get_session(&self) -> Result<SessionLookup, ProviderError> {
        Ok(match self.live_session.lock().clone() {
            Some(object) => SessionLookup::Established(object),
            None => SessionLookup::Absent,
        })
    }

    async fn authenticate(&self, _credentials: &Credentials) -> Result<Transaction, ProviderError> {
        let answer = self
            .authn_answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(transaction("SUCCESS", Some("tok123"))));
        if matches!(&answer, Ok(tx) if tx.is_success()) {
            self.with_live_session();
        }
        answer
    }

    async fn authorize(
        &self,
        request: &AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, ProviderError> {
        self.authorize_requests.lock().push(request.clone());
        if !self.has_session() && request.session_token.is_none() {
            return Ok(AuthorizeOutcome::LoginRequired);
        }

        let serial = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let wants = |t| request.response_types.contains(&t);
        let exp = self.id_token_exp.lock().clone();
        let mint = || match exp {
            Some(exp) => id_token_expiring(serial, exp),
            None => id_token(serial),
        };
        Ok(AuthorizeOutcome::Issued(IssuedTokens {
            id_token: wants(ResponseType::IdToken).then(mint),
            access_token: wants(ResponseType::Token).then(|| format!("AT{serial}")),
            expires_in: Some(3600),
        }))
    }

    async fn refresh_session(&self) -> Result<SessionLookup, ProviderError> {
        let mut live = self.live_session.lock();
        Ok(match live.as_mut() {
            Some(object) => {
                object.expires_at = Some("2026-10-16T16:00:00.000Z".into());
                SessionLookup::Established(object.clone())
            }
            None => SessionLookup::Absent,
        })
    }

    async fn close_session(&self) -> Result<(), ProviderError> {
        if let Some(e) = self.fail_close.lock().clone() {
            return Err(e);
        }
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.drop_session();
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        self.drop_session();
        Ok(())
    }
}

/// Widget replaying scripted render results
#[derive(Debug, Default)]
pub struct ScriptedWidget {
    pub renders: VecDeque<Result<WidgetOutcome, WidgetError>>,
    pub render_calls: usize,
    pub reloads: usize,
}

impl ScriptedWidget {
    pub fn new(renders: impl IntoIterator<Item = Result<WidgetOutcome, WidgetError>>) -> Self {
        Self {
            renders: renders.into_iter().collect(),
            ..Default::default()
        }
    }
}

pub fn widget_success() -> Result<WidgetOutcome, WidgetError> {
    Ok(WidgetOutcome {
        user: "alice@example.com".into(),
        transaction: transaction("SUCCESS", Some("tokW")),
    })
}

pub fn transient() -> Result<WidgetOutcome, WidgetError> {
    Err(WidgetError::TransientRender("widget assets failed to load".into()))
}

#[async_trait]
impl SignInWidget for ScriptedWidget {
    async fn render(&mut self) -> Result<WidgetOutcome, WidgetError> {
        self.render_calls += 1;
        self.renders
            .pop_front()
            .unwrap_or_else(|| Err(WidgetError::Failed("script exhausted".into())))
    }

    async fn reload(&mut self) -> Result<(), WidgetError> {
        self.reloads += 1;
        Ok(())
    }
}
