//! # Sessiongate Server - Protected Resource Server
//!
//! An axum application exposing `GET /protected`, which answers with the
//! caller's avatar when their access token carries the `gravatar` scope.
//! Tokens are checked by [`sessiongate_auth`]'s bearer layer.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sessiongate_auth::TokenVerifier;
//! use sessiongate_server::{ServerConfig, router};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let verifier = Arc::new(TokenVerifier::new(config.verifier_config())?);
//! let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;
//! axum::serve(listener, router(verifier, &config)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod routes;

pub use cli::ServerArgs;
pub use config::{ConfigError, LoggingConfig, ServerConfig};
pub use routes::{AppState, AvatarResponse, gravatar_url, router};
