/// Access Token Authorization Middleware
///
/// Validates the bearer access token from the Authorization header and
/// injects the resolved `AuthenticatedUser` into request extensions for use by
/// route handlers. Requests that fail are answered here with a uniform 401 and
/// never reach the wrapped service.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{extract_bearer_token, validate_access_token};
use crate::error::{AppError, AuthError};

/// Identity established by `RequireAuthorization`
///
/// Taking this as a handler argument is what makes a handler authenticated.
/// Outside the middleware the extractor rejects with the same 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .copied()
                .ok_or(AppError::Auth(AuthError::Unauthorized)),
        )
    }
}

/// Middleware for protecting routes
///
/// Wrap a scope or resource; every request must carry a valid access token.
pub struct RequireAuthorization {
    signing_key: Rc<str>,
}

impl RequireAuthorization {
    pub fn new(signing_key: impl Into<String>) -> Self {
        Self {
            signing_key: Rc::from(signing_key.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuthorization
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthorizationService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthorizationService {
            service: Rc::new(service),
            signing_key: Rc::clone(&self.signing_key),
        }))
    }
}

pub struct RequireAuthorizationService<S> {
    service: Rc<S>,
    signing_key: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthorizationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = extract_bearer_token(req.headers())
            .map_err(AppError::from)
            .and_then(|token| {
                validate_access_token(&token, &self.signing_key).map_err(AppError::from)
            });

        match outcome {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUser { user_id });
                tracing::debug!(user_id = %user_id, "Access token validated");

                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                })
            }
            Err(e) => {
                // the response is uniform, the logged reason is not
                let response = e.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}
