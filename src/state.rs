use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthError, AuthService, PasswordHasher, TokenIssuer};
use crate::config::AuthConfig;
use crate::repository::{TaskStore, UserStore};

/// Whether the public registration endpoint may create administrators.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationPolicy {
    pub allow_admin_registration: bool,
}

/// Everything the routes need, built once and cloned into each worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub users: web::Data<dyn UserStore>,
    pub tasks: web::Data<dyn TaskStore>,
    pub policy: web::Data<RegistrationPolicy>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        config: &AuthConfig,
    ) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
        ));
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let auth = AuthService::new(Arc::clone(&users), hasher, Arc::clone(&tokens))?;

        Ok(Self {
            auth: web::Data::new(auth),
            users: web::Data::from(users),
            tasks: web::Data::from(tasks),
            policy: web::Data::new(RegistrationPolicy {
                allow_admin_registration: config.allow_admin_registration,
            }),
            tokens,
        })
    }
}
