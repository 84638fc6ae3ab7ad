use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The owner identity of the current request, as verified by `AuthMiddleware`.
///
/// Handlers take this instead of any client-supplied user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i64);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => {
                let err = AppError::Unauthorized(
                    "User ID not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthenticatedUserId(123));

        let mut payload = Payload::None;
        let extracted_id = AuthenticatedUserId::from_request(&req, &mut payload).await;
        assert_eq!(extracted_id.unwrap().0, 123);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let extracted_id_result = AuthenticatedUserId::from_request(&req, &mut payload).await;
        assert!(extracted_id_result.is_err());

        let response = extracted_id_result.unwrap_err().error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
