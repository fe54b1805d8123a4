//! sessiongate-server entry point

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sessiongate_auth::TokenVerifier;
use sessiongate_server::{ServerArgs, router};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    let config = args.resolve().context("loading configuration")?;
    config
        .logging
        .init()
        .context("initializing logging")?;

    let verifier = Arc::new(
        TokenVerifier::new(config.verifier_config()).context("building token verifier")?,
    );
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        %addr,
        issuer = %config.issuer,
        audience = %config.audience,
        strict_scopes = config.strict_scopes,
        "Resource server listening"
    );

    axum::serve(listener, router(verifier, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("Resource server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
