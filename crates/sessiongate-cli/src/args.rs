//! Command-line arguments

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser};
use sessiongate_session::ClientConfig;
use tracing::Level;

use crate::commands::Command;

/// sessiongate - sign in to an OpenID Provider and manage the session
#[derive(Parser, Debug)]
#[command(name = "sessiongate", version, about, author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Provider and storage settings
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Enable verbose logging (-v, -vv, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log level selected by `-v`/`-q`
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Install a stderr subscriber; stdout carries command output
    pub fn init_tracing(&self) {
        tracing_subscriber::fmt()
            .with_max_level(self.log_level())
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Settings shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Identity provider org URL
    #[arg(
        long,
        env = "SESSIONGATE_BASE_URL",
        default_value = "https://example.oktapreview.com",
        global = true
    )]
    pub base_url: String,

    /// OAuth client id
    #[arg(long, env = "SESSIONGATE_CLIENT_ID", default_value = "CLIENT_ID", global = true)]
    pub client_id: String,

    /// Registered redirect URI
    #[arg(
        long,
        env = "SESSIONGATE_REDIRECT_URI",
        default_value = "http://localhost:8080/",
        global = true
    )]
    pub redirect_uri: String,

    /// Custom authorization server id
    #[arg(long, env = "SESSIONGATE_AUTHORIZATION_SERVER", global = true)]
    pub authorization_server: Option<String>,

    /// Scopes to request
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "openid,email,profile,groups",
        global = true
    )]
    pub scopes: Vec<String>,

    /// Protected resource called by `api-call`
    #[arg(
        long,
        env = "SESSIONGATE_API_URL",
        default_value = "http://localhost:9000/protected",
        global = true
    )]
    pub api_url: String,

    /// Session store file (default: <config dir>/sessiongate/session.json)
    #[arg(long, env = "SESSIONGATE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Identity provider request timeout in seconds
    #[arg(long, env = "SESSIONGATE_TIMEOUT", default_value_t = 10, global = true)]
    pub timeout: u64,
}

impl GlobalArgs {
    /// Provider configuration from these flags
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::default()
            .with_base_url(&self.base_url)
            .with_client_id(&self.client_id)
            .with_redirect_uri(&self.redirect_uri)
            .with_scopes(self.scopes.iter().cloned())
            .with_request_timeout(Duration::from_secs(self.timeout));
        match &self.authorization_server {
            Some(id) => config.with_authorization_server(id),
            None => config,
        }
    }

    /// Session store location
    ///
    /// # Errors
    ///
    /// Fails when `--store` is absent and the platform has no config
    /// directory.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.store {
            return Ok(path.clone());
        }
        let dir = dirs::config_dir().context("no config directory; pass --store")?;
        Ok(dir.join("sessiongate").join("session.json"))
    }
}
