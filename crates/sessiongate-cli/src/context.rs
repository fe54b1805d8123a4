//! Per-invocation client setup
//!
//! Each CLI run is a fresh process. The provider session cookie is carried
//! between runs in the store under [`SESSION_ID_KEY`] next to the persisted
//! auth record.

use std::path::Path;

use anyhow::Context as _;
use sessiongate_session::{AuthSessionClient, FileStore, KeyValueStore, OktaProvider};
use tracing::debug;

use crate::args::GlobalArgs;

/// Store key holding the provider session id between runs
pub const SESSION_ID_KEY: &str = "sid";

/// Client type used by every command
pub type Client = AuthSessionClient<OktaProvider, FileStore>;

/// Everything a command needs
#[derive(Debug)]
pub struct Context {
    /// Session client over the on-disk store
    pub client: Client,
    /// Protected resource URL
    pub api_url: String,
    http: reqwest::Client,
}

impl Context {
    /// Open the store named by `args` and resume any saved provider session
    ///
    /// # Errors
    ///
    /// Fails for an unreadable store or an invalid provider URL.
    pub fn open(args: &GlobalArgs) -> anyhow::Result<Self> {
        let path = args.store_path()?;
        Self::with_store(args, &path)
    }

    /// [`open`](Self::open) with an explicit store path
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open).
    pub fn with_store(args: &GlobalArgs, path: &Path) -> anyhow::Result<Self> {
        let store = FileStore::open(path)
            .with_context(|| format!("opening session store {}", path.display()))?;

        let mut provider =
            OktaProvider::new(args.client_config()).context("configuring identity provider")?;
        if let Some(sid) = store.get(SESSION_ID_KEY)? {
            debug!("Resuming saved provider session");
            provider = provider.with_session_id(&sid);
        }

        Ok(Self {
            client: AuthSessionClient::new(provider, store),
            api_url: args.api_url.clone(),
            http: reqwest::Client::new(),
        })
    }

    /// Scopes to request, as configured on the provider
    pub fn scopes(&self) -> &[String] {
        &self.client.provider().config().scopes
    }

    /// HTTP client for resource server calls
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Save the provider session id for the next run
    ///
    /// # Errors
    ///
    /// Store write failures.
    pub fn save_session_id(&self) -> anyhow::Result<()> {
        if let Some(sid) = self.client.provider().session_id() {
            self.client.store().set(SESSION_ID_KEY, sid)?;
        }
        Ok(())
    }

    /// Drop the saved provider session id
    ///
    /// # Errors
    ///
    /// Store write failures.
    pub fn forget_session_id(&self) -> anyhow::Result<()> {
        self.client.store().remove(SESSION_ID_KEY)?;
        Ok(())
    }
}
