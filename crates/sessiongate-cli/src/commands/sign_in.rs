//! `login` and `widget-login`

use anyhow::Context as _;
use sessiongate_session::{
    AuthResult, CredentialWidget, Credentials, SessionPresence, TokenRequest,
};
use tracing::info;

use super::pretty;
use crate::context::Context;

const LOGIN_RESPONSE_TYPES: [&str; 2] = ["id_token", "token"];

pub(super) async fn login(ctx: &Context, credentials: Credentials) -> anyhow::Result<String> {
    let auth = ctx
        .client
        .sign_in(&credentials)
        .await
        .context("sign-in failed")?;
    finish(ctx, auth).await
}

/// A live provider session skips the widget and only issues tokens
pub(super) async fn widget_login(
    ctx: &Context,
    credentials: Credentials,
) -> anyhow::Result<String> {
    if let SessionPresence::Present(object) = ctx.client.check_existing_session().await? {
        info!(session_id = %object.id, "Session already live, widget not rendered");
        let tokens = ctx
            .client
            .issue_tokens(&TokenRequest {
                session_token: None,
                response_types: LOGIN_RESPONSE_TYPES.map(String::from).to_vec(),
                scopes: ctx.scopes().to_vec(),
            })
            .await
            .context("token request failed")?;
        ctx.save_session_id()?;
        return pretty(&tokens);
    }

    let mut widget = CredentialWidget::new(ctx.client.provider(), credentials);
    let auth = ctx
        .client
        .launch_widget(&mut widget)
        .await
        .context("widget sign-in failed")?;
    info!(renders = widget.renders(), "Widget completed");
    finish(ctx, auth).await
}

async fn finish(ctx: &Context, auth: AuthResult) -> anyhow::Result<String> {
    let tokens = ctx
        .client
        .issue_tokens(&TokenRequest::new(
            auth.session_token,
            LOGIN_RESPONSE_TYPES,
            ctx.scopes().iter().cloned(),
        ))
        .await
        .context("token request failed")?;
    ctx.save_session_id()?;
    pretty(&tokens)
}
