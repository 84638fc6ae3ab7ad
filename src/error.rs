//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a service can report is one of its variants, and each variant maps to
//! exactly one HTTP status so the transport layer never has to inspect messages.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into JSON responses. Persistence and internal failures are logged here and replaced
//! by a generic message, so database errors, hashes or SQL never reach a client.
//! `From` implementations for `StoreError`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` allow use of the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Message sent to clients in place of any internal failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Bad login, or a missing, malformed or expired session token (HTTP 401).
    Unauthorized(String),
    /// The caller is authenticated but does not own the resource (HTTP 403).
    Forbidden(String),
    /// A malformed request, e.g. an unknown priority filter (HTTP 400).
    BadRequest(String),
    /// The requested entity does not exist (HTTP 404).
    NotFound(String),
    /// A duplicate entity, e.g. a username that is already taken (HTTP 409).
    Conflict(String),
    /// Failed input validation on a request payload (HTTP 422).
    ValidationError(String),
    /// An unexpected server-side failure (HTTP 500). The message is logged, not sent.
    InternalServerError(String),
    /// A failure reported by a store (HTTP 500). The message is logged, not sent.
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message that is safe to return to a client.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => INTERNAL_ERROR_MESSAGE,
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::InternalServerError(_) | AppError::DatabaseError(_) = self {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Store failures surface as opaque database errors.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
