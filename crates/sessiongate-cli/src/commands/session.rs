//! `status`, `refresh`, `close` and `logout`

use anyhow::Context as _;
use sessiongate_session::{Ack, SessionPresence};

use super::pretty;
use crate::context::Context;

pub(super) async fn status(ctx: &Context) -> anyhow::Result<String> {
    match ctx.client.check_existing_session().await? {
        SessionPresence::Present(session) => pretty(&session),
        SessionPresence::Absent => {
            ctx.forget_session_id()?;
            Ok("No session".to_string())
        }
    }
}

pub(super) async fn refresh(ctx: &Context) -> anyhow::Result<String> {
    let session = ctx
        .client
        .refresh_session()
        .await
        .context("session refresh failed")?;
    ctx.save_session_id()?;
    pretty(&session)
}

pub(super) async fn close(ctx: &Context) -> anyhow::Result<String> {
    let ack: Ack = ctx.client.close_session().await?;
    ctx.forget_session_id()?;
    Ok(ack.to_string())
}

pub(super) async fn logout(ctx: &Context) -> anyhow::Result<String> {
    let ack = ctx.client.sign_out().await?;
    ctx.forget_session_id()?;
    Ok(ack.to_string())
}
