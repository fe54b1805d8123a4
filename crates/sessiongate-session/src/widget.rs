//! Sign-in widget seam
//!
//! A widget runs an interactive login and eventually reports a terminal
//! transaction. [`AuthSessionClient::launch_widget`](crate::AuthSessionClient::launch_widget)
//! owns the retry policy: one reload after a
//! [`WidgetError::TransientRender`], never more.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ProviderError, WidgetError};
use crate::provider::IdentityProvider;
use crate::types::{Credentials, Transaction};

/// Terminal result of a widget session
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOutcome {
    /// Login name the user entered
    pub user: String,
    /// Final transaction
    pub transaction: Transaction,
}

/// An interactive sign-in surface
#[async_trait]
pub trait SignInWidget: Send {
    /// Render and run until a terminal transaction
    async fn render(&mut self) -> Result<WidgetOutcome, WidgetError>;

    /// Tear down and re-create the widget
    async fn reload(&mut self) -> Result<(), WidgetError>;
}

/// Headless widget that submits fixed credentials
///
/// Used where no UI exists. Provider 5xx answers are reported as transient
/// render failures, matching how a hosted widget fails to load.
#[derive(Debug)]
pub struct CredentialWidget<'a, P> {
    provider: &'a P,
    credentials: Credentials,
    renders: u32,
}

impl<'a, P: IdentityProvider> CredentialWidget<'a, P> {
    /// Widget that signs in `credentials` through `provider`
    pub fn new(provider: &'a P, credentials: Credentials) -> Self {
        Self {
            provider,
            credentials,
            renders: 0,
        }
    }

    /// How many times the widget has rendered
    pub fn renders(&self) -> u32 {
        self.renders
    }
}

#[async_trait]
impl<P: IdentityProvider> SignInWidget for CredentialWidget<'_, P> {
    async fn render(&mut self) -> Result<WidgetOutcome, WidgetError> {
        self.renders += 1;
        match self.provider.authenticate(&self.credentials).await {
            Ok(transaction) => Ok(WidgetOutcome {
                user: self.credentials.username.clone(),
                transaction,
            }),
            Err(ProviderError::Status { status, body }) if status >= 500 => {
                Err(WidgetError::TransientRender(format!("{status}: {body}")))
            }
            Err(e) => Err(WidgetError::Failed(e.to_string())),
        }
    }

    async fn reload(&mut self) -> Result<(), WidgetError> {
        debug!(renders = self.renders, "Reloading credential widget");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorizeOutcome, AuthorizeRequest, SessionLookup};

    /// Provider whose sign-in always answers with `answer`
    struct Fixed(Result<Transaction, ProviderError>);

    #[async_trait]
    impl IdentityProvider for Fixed {
        async fn get_session(&self) -> Result<SessionLookup, ProviderError> {
            Ok(SessionLookup::Absent)
        }

        async fn authenticate(&self, _: &Credentials) -> Result<Transaction, ProviderError> {
            self.0.clone()
        }

        async fn authorize(
            &self,
            _: &AuthorizeRequest,
        ) -> Result<AuthorizeOutcome, ProviderError> {
            Ok(AuthorizeOutcome::LoginRequired)
        }

        async fn refresh_session(&self) -> Result<SessionLookup, ProviderError> {
            Ok(SessionLookup::Absent)
        }

        async fn close_session(&self) -> Result<(), ProviderError> {
            Ok(())
        }

        async fn sign_out(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn render(answer: Result<Transaction, ProviderError>) -> Result<WidgetOutcome, WidgetError> {
        let provider = Fixed(answer);
        let mut widget = CredentialWidget::new(&provider, Credentials::new("alice", "pw"));
        tokio_test::block_on(widget.render())
    }

    #[test]
    fn test_server_errors_are_transient() {
        let result = render(Err(ProviderError::Status {
            status: 502,
            body: String::new(),
        }));
        assert!(matches!(result, Err(WidgetError::TransientRender(_))));
    }

    #[test]
    fn test_rejection_is_terminal() {
        let result = render(Err(ProviderError::Rejected("Authentication failed".into())));
        assert!(matches!(result, Err(WidgetError::Failed(_))));
    }

    #[test]
    fn test_transaction_is_reported_as_is() {
        let result = render(Ok(Transaction {
            status: "LOCKED_OUT".into(),
            session_token: None,
            expires_at: None,
            extra: serde_json::Map::new(),
        }))
        .unwrap();
        assert_eq!(result.user, "alice");
        assert_eq!(result.transaction.status, "LOCKED_OUT");
    }
}
