//! Client configuration

use std::time::Duration;

/// Where the identity provider lives and who this client is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Org base URL, e.g. `https://example.oktapreview.com`
    pub base_url: String,
    /// OAuth client id
    pub client_id: String,
    /// Registered redirect URI
    pub redirect_uri: String,
    /// Default scopes for token requests
    pub scopes: Vec<String>,
    /// Custom authorization server id; `None` uses the org server
    pub authorization_server: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.oktapreview.com".to_string(),
            client_id: "CLIENT_ID".to_string(),
            redirect_uri: "http://localhost:8080/".to_string(),
            scopes: ["openid", "email", "profile", "groups"]
                .into_iter()
                .map(String::from)
                .collect(),
            authorization_server: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Set the org base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the client id
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the redirect URI
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Replace the default scopes
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Use a custom authorization server
    #[must_use]
    pub fn with_authorization_server(mut self, id: impl Into<String>) -> Self {
        self.authorization_server = Some(id.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute URL for an org API path such as `/api/v1/authn`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Authorization endpoint
    pub fn authorize_endpoint(&self) -> String {
        match &self.authorization_server {
            Some(id) => self.api_url(&format!("/oauth2/{id}/v1/authorize")),
            None => self.api_url("/oauth2/v1/authorize"),
        }
    }
}
