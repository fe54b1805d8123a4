//! CLI command implementations
//!
//! Every command returns the text to print on stdout; logging goes to
//! stderr.

mod api;
mod session;
mod sign_in;
mod tokens;

use clap::{Args, Subcommand};
use serde::Serialize;
use sessiongate_session::Credentials;

use crate::context::Context;

/// All available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with username and password, then request tokens
    Login(CredentialArgs),

    /// Sign in through the headless widget, then request tokens; a live
    /// session skips the widget
    WidgetLogin(CredentialArgs),

    /// Report whether the provider has a live session
    Status,

    /// Request tokens from the live session
    Tokens(TokensArgs),

    /// Obtain a fresh ID token, keeping the access token
    Renew,

    /// Decode a token without verifying it
    Decode(DecodeArgs),

    /// Extend the provider session
    Refresh,

    /// Close the provider session
    Close,

    /// Call the protected resource with the access token
    ApiCall,

    /// Sign out and clear local state
    Logout,
}

impl Command {
    /// Run the command
    ///
    /// # Errors
    ///
    /// Session, provider and storage failures, with context.
    pub async fn execute(self, ctx: &Context) -> anyhow::Result<String> {
        match self {
            Command::Login(args) => sign_in::login(ctx, args.credentials()).await,
            Command::WidgetLogin(args) => sign_in::widget_login(ctx, args.credentials()).await,
            Command::Status => session::status(ctx).await,
            Command::Tokens(args) => tokens::issue(ctx, args.response_types).await,
            Command::Renew => tokens::renew(ctx).await,
            Command::Decode(args) => tokens::decode(ctx, args.token.as_deref()),
            Command::Refresh => session::refresh(ctx).await,
            Command::Close => session::close(ctx).await,
            Command::ApiCall => api::call(ctx).await,
            Command::Logout => session::logout(ctx).await,
        }
    }
}

/// Username and password
#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// Login name
    #[arg(short, long, env = "SESSIONGATE_USERNAME")]
    pub username: String,

    /// Password
    #[arg(short, long, env = "SESSIONGATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl CredentialArgs {
    fn credentials(self) -> Credentials {
        Credentials::new(self.username, self.password)
    }
}

/// Arguments of `tokens`
#[derive(Args, Debug)]
pub struct TokensArgs {
    /// Response types to request
    #[arg(
        long = "response-type",
        value_delimiter = ',',
        default_value = "id_token,token"
    )]
    pub response_types: Vec<String>,
}

/// Arguments of `decode`
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Token to decode (default: the stored ID token)
    pub token: Option<String>,
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
