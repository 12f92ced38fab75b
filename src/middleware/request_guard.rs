/// Request Guard Middleware
///
/// Validates the access token from the Authorization header and injects
/// the authenticated subject into request extensions for route handlers.

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderValue, AUTHORIZATION},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{TokenCodec, TokenKind};
use crate::error::{AppError, AuthError};

const BEARER_PREFIX: &str = "Bearer ";

/// Identity bound by the guard for the lifetime of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
}

/// Handlers on guarded routes take `AuthenticatedUser` as an argument.
/// On an unguarded route the extractor fails with 401.
impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or(AppError::Auth(AuthError::MissingToken)),
        )
    }
}

/// Returns the token from an `Authorization: Bearer <token>` header.
/// The prefix must match exactly and the token must be non-empty.
pub fn bearer_token(header: Option<&HeaderValue>) -> Option<&str> {
    header
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}

/// Middleware for protecting routes
///
/// Single pass: no retries, no refresh on the caller's behalf.
pub struct RequestGuard {
    codec: Arc<TokenCodec>,
}

impl RequestGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestGuardService {
            service: Rc::new(service),
            codec: Arc::clone(&self.codec),
        }))
    }
}

pub struct RequestGuardService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for RequestGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = match bearer_token(req.headers().get(AUTHORIZATION)) {
            None => {
                tracing::warn!(path = %req.path(), "Missing or malformed Authorization header");
                Err(AuthError::MissingToken)
            }
            Some(token) => self.codec.verify(token, TokenKind::Access).map_err(|e| {
                // The reason stays in the log; the client gets a uniform 401
                tracing::warn!(path = %req.path(), error = %e, "Access token rejected");
                AuthError::InvalidToken
            }),
        };

        match verified {
            Ok(email) => {
                tracing::debug!(email = %email, "Access token validated");
                req.extensions_mut().insert(AuthenticatedUser { email });

                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => Box::pin(async move { Err(AppError::Auth(e).into()) }),
        }
    }
}
