//! HTTP implementation of [`IdentityProvider`] for Okta-style orgs
//!
//! - `POST /api/v1/authn` for primary authentication
//! - `/api/v1/sessions/me` for session lookup, refresh and close
//! - `GET /oauth2/v1/authorize` with `prompt=none` and
//!   `response_mode=fragment` for tokens
//!
//! The provider session is a cookie (`sid`), kept in a per-provider jar.
//! Redirects are never followed: the authorization response is read from the
//! `Location` header of the 302 itself.

use std::sync::Arc;

use async_trait::async_trait;
use http::{StatusCode, header};
use reqwest::cookie::{CookieStore, Jar};
use serde::Deserialize;
use sessiongate_auth::decode_token;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::IdentityProvider;
use crate::config::ClientConfig;
use crate::error::ProviderError;
use crate::types::{
    AuthorizeOutcome, AuthorizeRequest, Credentials, IssuedTokens, SessionLookup, SessionObject,
    Transaction,
};

const SESSION_COOKIE: &str = "sid";
const MAX_ERROR_BODY: usize = 512;

/// Okta error body (`errorCode`, `errorSummary`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_summary: Option<String>,
}

/// Identity provider speaking the Okta authn, sessions and authorize APIs
#[derive(Debug, Clone)]
pub struct OktaProvider {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    config: ClientConfig,
}

impl OktaProvider {
    /// Build a provider for `config`
    ///
    /// # Errors
    ///
    /// [`ProviderError::Protocol`] for an unparsable base URL,
    /// [`ProviderError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ProviderError::Protocol(format!("invalid base URL: {e}")))?;
        let jar = Arc::new(Jar::default());

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout)
            .user_agent(concat!("sessiongate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            jar,
            base_url,
            config,
        })
    }

    /// Resume a provider session from a previously saved session id
    #[must_use]
    pub fn with_session_id(self, session_id: &str) -> Self {
        self.jar.add_cookie_str(
            &format!("{SESSION_COOKIE}={session_id}; Path=/"),
            &self.base_url,
        );
        self
    }

    /// Current provider session id, if the jar holds one
    pub fn session_id(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.base_url)?;
        let cookies = cookies.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn session_call(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<SessionLookup, ProviderError> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::OK => {
                let session: SessionObject = response.json().await.map_err(|e| {
                    ProviderError::Protocol(format!("invalid session object: {e}"))
                })?;
                debug!(session_id = %session.id, "Provider session established");
                Ok(SessionLookup::Established(session))
            }
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => {
                debug!("No provider session");
                Ok(SessionLookup::Absent)
            }
            status => Err(status_error(status, response).await),
        }
    }

    async fn delete_session(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .delete(self.config.api_url("/api/v1/sessions/me"))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            status if status.is_success() => {
                info!("Provider session closed");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                debug!("Provider session already closed");
                Ok(())
            }
            status => Err(status_error(status, response).await),
        }
    }

    fn authorize_url(
        &self,
        request: &AuthorizeRequest,
        state: &str,
        nonce: &str,
    ) -> Result<Url, ProviderError> {
        let response_type = request
            .response_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let scope = request.scopes.join(" ");

        let mut url = Url::parse(&self.config.authorize_endpoint())
            .map_err(|e| ProviderError::Protocol(format!("invalid authorize endpoint: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.config.client_id)
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("response_type", &response_type)
                .append_pair("response_mode", "fragment")
                .append_pair("prompt", "none")
                .append_pair("scope", &scope)
                .append_pair("state", state)
                .append_pair("nonce", nonce);
            if let Some(token) = &request.session_token {
                query.append_pair("sessionToken", token);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for OktaProvider {
    async fn get_session(&self) -> Result<SessionLookup, ProviderError> {
        self.session_call(self.client.get(self.config.api_url("/api/v1/sessions/me")))
            .await
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Transaction, ProviderError> {
        info!(username = %credentials.username, "Primary authentication");
        let response = self
            .client
            .post(self.config.api_url("/api/v1/authn"))
            .header(header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::OK => response
                .json::<Transaction>()
                .await
                .map_err(|e| ProviderError::Protocol(format!("invalid transaction: {e}"))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let summary = response
                    .json::<ApiError>()
                    .await
                    .ok()
                    .and_then(|e| e.error_summary.or(e.error_code))
                    .unwrap_or_else(|| "Authentication failed".to_string());
                warn!(username = %credentials.username, %summary, "Authentication rejected");
                Err(ProviderError::Rejected(summary))
            }
            status => Err(status_error(status, response).await),
        }
    }

    async fn authorize(
        &self,
        request: &AuthorizeRequest,
    ) -> Result<AuthorizeOutcome, ProviderError> {
        let state = Uuid::new_v4().simple().to_string();
        let nonce = Uuid::new_v4().simple().to_string();
        let url = self.authorize_url(request, &state, &nonce)?;

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_redirection() {
            return Err(status_error(status, response).await);
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ProviderError::Protocol("redirect without Location".to_string()))?;
        let location = Url::parse(location)
            .or_else(|_| self.base_url.join(location))
            .map_err(|e| ProviderError::Protocol(format!("invalid Location: {e}")))?;

        let params = fragment_params(&location);
        let param = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        if param("state").as_deref() != Some(state.as_str()) {
            return Err(ProviderError::Protocol(
                "state mismatch in authorization response".to_string(),
            ));
        }

        if let Some(error) = param("error") {
            if error == "login_required" {
                debug!("Authorization requires login");
                return Ok(AuthorizeOutcome::LoginRequired);
            }
            let description = param("error_description").unwrap_or_default();
            warn!(%error, %description, "Authorization failed");
            return Err(ProviderError::Authorization { error, description });
        }

        let tokens = IssuedTokens {
            id_token: param("id_token"),
            access_token: param("access_token"),
            expires_in: param("expires_in").and_then(|v| v.parse().ok()),
        };

        if let Some(id_token) = &tokens.id_token {
            let decoded = decode_token(id_token)
                .map_err(|e| ProviderError::Protocol(format!("unreadable id_token: {e}")))?;
            if decoded.claim_str("nonce") != Some(nonce.as_str()) {
                return Err(ProviderError::Protocol("nonce mismatch in id_token".to_string()));
            }
        }

        info!(
            id_token = tokens.id_token.is_some(),
            access_token = tokens.access_token.is_some(),
            "Tokens issued"
        );
        Ok(AuthorizeOutcome::Issued(tokens))
    }

    async fn refresh_session(&self) -> Result<SessionLookup, ProviderError> {
        self.session_call(
            self.client
                .post(self.config.api_url("/api/v1/sessions/me/lifecycle/refresh")),
        )
        .await
    }

    async fn close_session(&self) -> Result<(), ProviderError> {
        self.delete_session().await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.delete_session().await
    }
}

fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport(e.to_string())
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> ProviderError {
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    ProviderError::Status {
        status: status.as_u16(),
        body,
    }
}

/// Decoded `key=value` pairs of a URL fragment
fn fragment_params(url: &Url) -> Vec<(String, String)> {
    url.fragment()
        .map(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}
