use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::session::SessionVerifier;
use crate::error::AppError;

/// Guards a scope: requests without a valid bearer token are answered with the error response
/// directly and never reach the wrapped handlers.
///
/// Expects a `web::Data<SessionVerifier>` in the application data.
pub struct AuthMiddleware;

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
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
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
        let outcome = match req.app_data::<web::Data<SessionVerifier>>() {
            Some(verifier) => {
                // A header that is not valid UTF-8 is treated like a wrong scheme.
                let authorization = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .map(|value| value.to_str().unwrap_or("invalid"));
                verifier.authenticate(authorization)
            }
            None => Err(AppError::InternalServerError(
                "SessionVerifier is not registered".into(),
            )),
        };

        match outcome {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUserId(user_id));
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            Err(app_err) => {
                log::debug!("Rejected request to {}: {}", req.path(), app_err);
                let response = app_err.error_response().map_into_right_body();
                Box::pin(ready(Ok(req.into_response(response))))
            }
        }
    }
}
