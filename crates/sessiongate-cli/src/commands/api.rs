//! `api-call`

use anyhow::{Context as _, bail};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{info, warn};

use super::pretty;
use crate::context::Context;

pub(super) async fn call(ctx: &Context) -> anyhow::Result<String> {
    ctx.client.restore_tokens()?;
    let Some(access_token) = ctx.client.access_token() else {
        bail!("no access token; run `sessiongate login` first");
    };

    let response = ctx
        .http()
        .get(&ctx.api_url)
        .header(AUTHORIZATION, format!("Bearer {access_token}"))
        .send()
        .await
        .with_context(|| format!("calling {}", ctx.api_url))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("{} did not return JSON", ctx.api_url))?;

    if !status.is_success() {
        warn!(%status, "Resource server refused the call");
        bail!("{status}: {body}");
    }

    if let (Some(image), Some(name)) = (
        body.get("image").and_then(Value::as_str),
        body.get("name").and_then(Value::as_str),
    ) {
        ctx.client.save_profile_image(image, name)?;
        info!(%name, "Profile image saved");
    }

    pretty(&body)
}
