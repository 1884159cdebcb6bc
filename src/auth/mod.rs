pub mod errors;
pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::models::PublicUser;

pub use errors::{AuthError, DuplicateField, TokenError};
pub use extractors::{AdminUser, AuthenticatedUser};
pub use gate::{authorize, Identity};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenIssuer};

/// Body returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
    /// The JWT to present as `Authorization: Bearer <token>`.
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

impl LoginResponse {
    pub fn new(user: PublicUser, token: String, tokens: &TokenIssuer) -> Self {
        Self {
            message: "Login successful".to_string(),
            user,
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.ttl().num_seconds(),
        }
    }
}
