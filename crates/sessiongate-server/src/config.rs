//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML/YAML/JSON file, then `SESSIONGATE_*` environment variables. Command
//! line flags are applied on top by [`ServerArgs`](crate::cli::ServerArgs).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sessiongate_auth::{FetchConfig, VerifierConfig};

/// Environment variable prefix (`SESSIONGATE_PORT`, `SESSIONGATE_LOGGING__LEVEL`)
pub const ENV_PREFIX: &str = "SESSIONGATE";

/// Resource server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Issuer access tokens must come from
    pub issuer: String,
    /// Audience access tokens must be issued for
    pub audience: String,
    /// Metadata document URL when it is not `{issuer}/.well-known/openid-configuration`
    pub metadata_url: Option<String>,
    /// Scope required by `/protected`
    pub required_scope: String,
    /// Answer a missing scope with 403 instead of 200
    pub strict_scopes: bool,
    /// Accept plain-HTTP provider URLs on non-loopback hosts
    pub allow_insecure_http: bool,
    /// Timeout for metadata and key set requests, in seconds
    pub fetch_timeout_secs: u64,
    /// Clock skew tolerated on token expiry, in seconds
    pub leeway_secs: u64,
    /// Logging
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            issuer: "https://example.oktapreview.com/as/ors71yywxk0GfFWmC0h7".to_string(),
            audience: "ViczvMucBWT14qg3lAM1".to_string(),
            metadata_url: None,
            required_scope: "gravatar".to_string(),
            strict_scopes: false,
            allow_insecure_http: false,
            fetch_timeout_secs: 5,
            leeway_secs: 0,
            logging: LoggingConfig::default(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Configuration parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// Values that parse but cannot be served
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ServerConfig {
    /// Load defaults, then `path` (if any), then `SESSIONGATE_*` variables
    ///
    /// # Errors
    ///
    /// - [`ConfigError::FileNotFound`] / [`ConfigError::UnsupportedFormat`]
    ///   for a bad `path`
    /// - [`ConfigError::ParseError`] for values of the wrong type
    /// - [`ConfigError::Invalid`] when [`validate`](Self::validate) fails
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// [`load`](Self::load) with a custom environment prefix
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load).
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            let format = match path.extension().and_then(|s| s.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("yaml" | "yml") => FileFormat::Yaml,
                Some("json") => FileFormat::Json,
                _ => return Err(ConfigError::UnsupportedFormat),
            };
            let name = path.to_str().ok_or(ConfigError::UnsupportedFormat)?;
            builder = builder.add_source(File::new(name, format));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Invalid("issuer must not be empty".into()));
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::Invalid("audience must not be empty".into()));
        }
        if self.required_scope.trim().is_empty() {
            return Err(ConfigError::Invalid("required_scope must not be empty".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_secs must be positive".into()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address to bind
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for an unparsable host.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bad listen address: {e}")))
    }

    /// Verifier settings for this server
    pub fn verifier_config(&self) -> VerifierConfig {
        let fetch = FetchConfig {
            request_timeout: Duration::from_secs(self.fetch_timeout_secs),
            ..FetchConfig::default()
        };
        let mut verifier = VerifierConfig::default()
            .with_fetch(fetch)
            .with_leeway(Duration::from_secs(self.leeway_secs));
        if let Some(url) = &self.metadata_url {
            verifier = verifier.with_metadata_url(&self.issuer, url);
        }
        if self.allow_insecure_http {
            verifier = verifier.allow_insecure_http();
        }
        verifier
    }
}
