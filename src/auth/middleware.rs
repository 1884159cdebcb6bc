use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::errors::AuthError;
use super::gate::authorize;
use super::token::TokenIssuer;
use crate::error::AppError;

/// Runs the authorization gate in front of every service it wraps.
///
/// On success the caller's [`Identity`](super::gate::Identity) is inserted into
/// the request extensions; on failure the request is answered with 401 and
/// never reaches the handler.
pub struct AuthMiddleware {
    tokens: Arc<TokenIssuer>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: Arc::clone(&self.tokens),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<TokenIssuer>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = match req.headers().get(header::AUTHORIZATION) {
            None => authorize(&self.tokens, ""),
            Some(value) => match value.to_str() {
                Ok(raw) => authorize(&self.tokens, raw),
                Err(_) => Err(AuthError::MalformedCredential),
            },
        };

        match outcome {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => {
                log::debug!("{} {} rejected: {}", req.method(), req.path(), err);
                let response = req
                    .error_response(AppError::from(err))
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
