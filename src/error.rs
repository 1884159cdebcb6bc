//!
//! # Error Handling
//!
//! `AppError` is the error type every HTTP handler returns. It implements
//! `actix_web::error::ResponseError`, turning each variant into a status code
//! and a `{"error": "..."}` JSON body.
//!
//! Server-side faults (`InternalServerError`, `DatabaseError`) are logged with
//! their detail and answered with a generic message. Authentication failures
//! arrive as [`AuthError`] and storage failures as [`StoreError`]; both convert
//! with `?`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::errors::{AuthError, TokenError};
use crate::repository::StoreError;

const GENERIC_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug)]
pub enum AppError {
    /// HTTP 401. Missing, malformed or rejected credentials.
    Unauthorized(String),
    /// HTTP 403. Authenticated, but the role or ownership check failed.
    Forbidden(String),
    /// HTTP 400.
    BadRequest(String),
    /// HTTP 404.
    NotFound(String),
    /// HTTP 409. Username or email already taken.
    Conflict(String),
    /// HTTP 500. The message is logged, never sent.
    InternalServerError(String),
    /// HTTP 500. The message is logged, never sent.
    DatabaseError(String),
    /// HTTP 422.
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::InternalServerError(detail) | AppError::DatabaseError(detail) => {
                log::error!("{}: {}", self.status_code(), detail);
                GENERIC_SERVER_ERROR
            }
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::DuplicateIdentity(field) => {
                AppError::Conflict(format!("{} already exists", field))
            }
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::MissingCredential => {
                AppError::Unauthorized("Authorization header is missing".into())
            }
            AuthError::MalformedCredential => {
                AppError::Unauthorized("Invalid authorization header format".into())
            }
            AuthError::Unauthenticated(TokenError::Expired) => {
                AppError::Unauthorized("Token has expired".into())
            }
            AuthError::Unauthenticated(_) => AppError::Unauthorized("Invalid token".into()),
            AuthError::Hashing(detail) | AuthError::Infrastructure(detail) => {
                AppError::InternalServerError(detail)
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Record not found".into()),
            StoreError::Duplicate(field) => AppError::Conflict(format!("{} already exists", field)),
            StoreError::Database(e) => AppError::DatabaseError(e.to_string()),
            StoreError::Unavailable(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        StoreError::from(error).into()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}
