//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the error conditions that can occur, from database issues to validation failures.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application
//! errors into the HTTP responses the API promises:
//!
//! - validation problems and disallowed patch fields become `400` with a JSON
//!   `{"error": {"message": ...}}` body,
//! - authentication failures become a uniform `401` whose body never discloses
//!   the cause,
//! - missing resources (including resources owned by somebody else) become an
//!   empty-bodied `404`,
//! - store and other unexpected failures become an empty-bodied `500`.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, and `bcrypt::BcryptError` allow conversion with
//! the `?` operator.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// The uniform message returned for every authentication failure, whatever the
/// cause. Missing header, bad signature, expired token, and revoked token must
/// be indistinguishable to the caller.
pub const AUTH_FAILURE_MESSAGE: &str = "Please authenticate.";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed (HTTP 401). The carried message is always
    /// [`AUTH_FAILURE_MESSAGE`]; use [`AppError::unauthenticated`] to construct it.
    Unauthorized(String),
    /// A malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist, or is not owned by the caller
    /// (HTTP 404, empty body).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500, empty body).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500, empty body).
    DatabaseError(String),
    /// Failed input validation (HTTP 400).
    ValidationError(String),
}

impl AppError {
    /// The single authentication failure value. Every auth failure path funnels
    /// through here so that the responses stay byte-identical.
    pub fn unauthenticated() -> Self {
        AppError::Unauthorized(AUTH_FAILURE_MESSAGE.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": { "message": msg }
            })),
            AppError::BadRequest(msg) | AppError::ValidationError(msg) => {
                HttpResponse::BadRequest().json(json!({
                    "error": { "message": msg }
                }))
            }
            // Not-found responses carry no body: a resource owned by another
            // user must be indistinguishable from one that never existed.
            AppError::NotFound(_) => HttpResponse::NotFound().finish(),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; any other database
/// error becomes `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::unauthenticated()
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
