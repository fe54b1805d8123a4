//! Tower Service performing bearer authentication
//!
//! On success the verified [`Principal`] is inserted into the request
//! extensions and the inner service is called. On failure the inner service
//! is never called and an [`AuthRejection`] response is returned instead.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use http::{Request, header};
use tower_service::Service;
use tracing::{debug, warn};

use super::rejection::AuthRejection;
use super::{BearerAuthConfig, bearer_token};
use crate::{Principal, TokenVerifier};

/// Future type for [`BearerAuthService`]
pub type BearerAuthServiceFuture<E> = BoxFuture<'static, Result<Response, E>>;

/// Tower Service that verifies bearer tokens before forwarding
#[derive(Debug, Clone)]
pub struct BearerAuthService<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
    config: Arc<BearerAuthConfig>,
}

impl<S> BearerAuthService<S> {
    /// Wrap `inner`
    pub fn new(inner: S, verifier: Arc<TokenVerifier>, config: Arc<BearerAuthConfig>) -> Self {
        Self {
            inner,
            verifier,
            config,
        }
    }

    /// Get a reference to the inner service
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, B> Service<Request<B>> for BearerAuthService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BearerAuthServiceFuture<S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        if self.config.should_bypass(req.uri().path()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        let Some(token) = token else {
            debug!(path = req.uri().path(), "Request without bearer token");
            let rejection = AuthRejection::MissingToken {
                realm: self.config.realm.clone(),
            };
            return Box::pin(async move { Ok(rejection.into_response()) });
        };

        let verifier = Arc::clone(&self.verifier);
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            match verifier
                .verify(&token, &config.audience, &config.issuer)
                .await
            {
                Ok(principal) => {
                    req.extensions_mut().insert::<Principal>(principal);
                    inner.call(req).await
                }
                Err(error) => {
                    warn!(code = error.code(), %error, "Bearer token rejected");
                    Ok(AuthRejection::Invalid {
                        realm: config.realm.clone(),
                        error,
                    }
                    .into_response())
                }
            }
        })
    }
}
