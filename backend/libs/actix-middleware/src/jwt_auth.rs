//! Bearer-token authentication
//!
//! [`JwtAuthMiddleware`] wraps the whole app. When a request carries an
//! `Authorization` header it is resolved once and the outcome is stored in
//! the request extensions; public routes ignore it. Handlers for gated
//! routes take an [`AuthenticatedPrincipal`], which turns a missing or
//! rejected header into a `401` before the handler body runs.

use access_control::{Principal, PrincipalResolver};
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use error_types::ServiceError;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Outcome of resolving the request's `Authorization` header
#[derive(Debug, Clone)]
struct AuthState {
    authorization: String,
    outcome: Result<Principal, ServiceError>,
}

/// JWT Authentication Middleware
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    resolver: Arc<PrincipalResolver>,
}

impl JwtAuthMiddleware {
    pub fn new(resolver: Arc<PrincipalResolver>) -> Self {
        Self { resolver }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            resolver: Arc::clone(&self.resolver),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    resolver: Arc<PrincipalResolver>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
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
        if let Some(value) = req.headers().get(AUTHORIZATION) {
            let state = match value.to_str() {
                Ok(header) => AuthState {
                    authorization: header.to_string(),
                    outcome: self.resolver.resolve(Some(header)),
                },
                Err(_) => AuthState {
                    authorization: String::new(),
                    outcome: Err(ServiceError::unauthorized(
                        "Authorization header is not valid ASCII",
                    )),
                },
            };

            if let Err(e) = &state.outcome {
                tracing::warn!(path = %req.path(), error = %e, "Bearer token rejected");
            }
            req.extensions_mut().insert(state);
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await })
    }
}

/// Principal of an authenticated request plus the header it came from
///
/// The raw header is kept so handlers can forward it to services that
/// require the caller's credentials.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub principal: Principal,
    pub authorization: String,
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.extensions().get::<AuthState>() {
            Some(AuthState {
                authorization,
                outcome: Ok(principal),
            }) => Ok(AuthenticatedPrincipal {
                principal: principal.clone(),
                authorization: authorization.clone(),
            }),
            Some(AuthState {
                outcome: Err(e), ..
            }) => Err(e.clone().into()),
            None => Err(ServiceError::unauthorized("Missing Authorization header").into()),
        };
        ready(result)
    }
}
