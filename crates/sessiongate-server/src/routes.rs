//! HTTP routes of the resource server

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use http::{HeaderName, Method, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sessiongate_auth::tower::BearerAuthLayer;
use sessiongate_auth::{Principal, TokenVerifier};
use sha2::{Digest, Sha256};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::ServerConfig;

/// Paths served without a token
pub const PUBLIC_PATHS: &[&str] = &["/health"];

/// Per-router settings visible to handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Scope `/protected` requires
    pub required_scope: Arc<str>,
    /// 403 instead of 200 when the scope is missing
    pub strict_scopes: bool,
}

impl From<&ServerConfig> for AppState {
    fn from(config: &ServerConfig) -> Self {
        Self {
            required_scope: Arc::from(config.required_scope.as_str()),
            strict_scopes: config.strict_scopes,
        }
    }
}

/// Body of a successful `/protected` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarResponse {
    /// Avatar URL
    pub image: String,
    /// Email the avatar belongs to
    pub name: String,
}

/// Build the application router
///
/// Layers from the inside out: bearer authentication, CORS, request tracing.
/// Preflight requests never reach authentication.
pub fn router(verifier: Arc<TokenVerifier>, config: &ServerConfig) -> Router {
    let auth = PUBLIC_PATHS.iter().fold(
        BearerAuthLayer::new(verifier, &config.audience, &config.issuer),
        |layer, path| layer.bypass_path(*path),
    );

    Router::new()
        .route("/protected", get(protected))
        .route("/health", get(health))
        .layer(auth)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::from(config))
}

async fn protected(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Response {
    let name = principal
        .email
        .clone()
        .unwrap_or_else(|| principal.subject.clone());
    info!(user = %name, "Accessing protected resource");

    if principal.has_scope(&state.required_scope) {
        return Json(AvatarResponse {
            image: gravatar_url(&name),
            name,
        })
        .into_response();
    }

    debug!(
        required = %state.required_scope,
        granted = ?principal.scopes,
        "Scope missing"
    );
    let status = if state.strict_scopes {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::OK
    };
    let body = json!({ "Error": format!("Scope \"{}\" not defined", state.required_scope) });
    (status, Json(body)).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Gravatar URL for `email`: 200px, PG rated, retro fallback
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?s=200&r=pg&d=retro")
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("withcredentials"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-forwarded-for"),
            HeaderName::from_static("x-real-ip"),
            HeaderName::from_static("x-customheader"),
            header::USER_AGENT,
            HeaderName::from_static("keep-alive"),
            header::HOST,
            header::ACCEPT,
            header::CONNECTION,
            header::CONTENT_TYPE,
        ])
}
