//! `tokens`, `renew` and `decode`

use anyhow::{Context as _, bail};
use sessiongate_session::{SessionPresence, TokenRequest};

use super::pretty;
use crate::context::Context;

pub(super) async fn issue(ctx: &Context, response_types: Vec<String>) -> anyhow::Result<String> {
    resume(ctx).await?;
    let tokens = ctx
        .client
        .issue_tokens(&TokenRequest {
            session_token: None,
            response_types,
            scopes: ctx.scopes().to_vec(),
        })
        .await
        .context("token request failed")?;
    pretty(&tokens)
}

pub(super) async fn renew(ctx: &Context) -> anyhow::Result<String> {
    resume(ctx).await?;
    ctx.client.restore_tokens()?;
    let tokens = ctx
        .client
        .renew_id_token(ctx.scopes())
        .await
        .context("ID token renewal failed")?;
    pretty(&tokens)
}

pub(super) fn decode(ctx: &Context, token: Option<&str>) -> anyhow::Result<String> {
    let token = match token {
        Some(token) => token.to_string(),
        None => {
            let Some(token) = ctx
                .client
                .persisted()?
                .user_info
                .and_then(|info| info.id_token)
            else {
                bail!("no stored ID token; pass one explicitly");
            };
            token
        }
    };
    let decoded = ctx.client.decode_token(&token)?;
    pretty(&decoded)
}

/// Pick up the provider session saved by an earlier run
async fn resume(ctx: &Context) -> anyhow::Result<()> {
    if let SessionPresence::Absent = ctx.client.check_existing_session().await? {
        bail!("no session; run `sessiongate login` first");
    }
    Ok(())
}
