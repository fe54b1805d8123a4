//! Command-line flags of the server binary

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ServerConfig};

/// sessiongate-server - resource server guarded by OIDC bearer tokens
///
/// Settings come from defaults, then `--config`, then `SESSIONGATE_*`
/// environment variables, then these flags.
#[derive(Parser, Debug, Default)]
#[command(name = "sessiongate-server", version, about)]
pub struct ServerArgs {
    /// Configuration file (.toml, .yaml, .yml or .json)
    #[arg(short, long, env = "SESSIONGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Expected token issuer
    #[arg(long)]
    pub issuer: Option<String>,

    /// Expected token audience
    #[arg(long)]
    pub audience: Option<String>,

    /// Metadata document URL, when not under the issuer
    #[arg(long)]
    pub metadata_url: Option<String>,

    /// Answer a missing scope with 403 Forbidden
    #[arg(long)]
    pub strict_scopes: bool,

    /// Allow plain-HTTP provider URLs (local development only)
    #[arg(long)]
    pub allow_insecure_http: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl ServerArgs {
    /// Load the layered configuration and apply these flags on top
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from loading or validating.
    pub fn resolve(&self) -> Result<ServerConfig, ConfigError> {
        let config = ServerConfig::load(self.config.as_deref())?;
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(issuer) = &self.issuer {
            config.issuer.clone_from(issuer);
        }
        if let Some(audience) = &self.audience {
            config.audience.clone_from(audience);
        }
        if let Some(url) = &self.metadata_url {
            config.metadata_url = Some(url.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        config.strict_scopes |= self.strict_scopes;
        config.allow_insecure_http |= self.allow_insecure_http;
        config.logging.json |= self.log_json;
        config
    }
}
