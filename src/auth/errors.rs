use std::fmt;

use thiserror::Error;

/// Which unique field a registration collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::Username => f.write_str("username"),
            DuplicateField::Email => f.write_str("email"),
        }
    }
}

/// Why a bearer token was rejected, or why one could not be produced.
///
/// `Expired` is kept apart from the other rejection kinds: an expired token
/// means "log in again", the rest mean "reject outright".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Failures of the authentication and authorization core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown user, wrong password or inactive account. Deliberately one kind.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0} already exists")]
    DuplicateIdentity(DuplicateField),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authorization header is missing")]
    MissingCredential,

    #[error("authorization header must be `Bearer <token>`")]
    MalformedCredential,

    #[error("unauthenticated: {0}")]
    Unauthenticated(TokenError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("authentication infrastructure failure: {0}")]
    Infrastructure(String),
}

impl AuthError {
    /// Server-side faults, as opposed to anything the client did.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, AuthError::Hashing(_) | AuthError::Infrastructure(_))
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::Validation(errors.to_string())
    }
}
