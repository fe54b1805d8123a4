//! # Sessiongate CLI
//!
//! Command-line front-end for [`sessiongate_session`]: sign in, request and
//! renew tokens, inspect and end the provider session, and call a protected
//! resource with the access token.
//!
//! ```text
//! sessiongate login -u alice@example.com -p ...
//! sessiongate api-call
//! sessiongate renew
//! sessiongate logout
//! ```
//!
//! State survives between runs in a JSON file store (see
//! [`GlobalArgs::store_path`](args::GlobalArgs::store_path)).

pub mod args;
pub mod commands;
pub mod context;

pub use args::{Cli, GlobalArgs};
pub use commands::Command;
pub use context::Context;

impl Cli {
    /// Open the store and run the selected command
    ///
    /// # Errors
    ///
    /// Whatever the command reports.
    pub async fn execute(self) -> anyhow::Result<String> {
        let ctx = Context::open(&self.global)?;
        self.command.execute(&ctx).await
    }
}
