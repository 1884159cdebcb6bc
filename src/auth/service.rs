//! Login and registration.
//!
//! Login collapses "no such user", "wrong password" and "inactive account"
//! into a single [`AuthError::InvalidCredentials`] so responses cannot be used
//! to enumerate usernames. An unknown username still costs one bcrypt
//! verification against a throwaway hash.

use std::sync::Arc;

use validator::Validate;

use super::errors::{AuthError, DuplicateField};
use super::password::PasswordHasher;
use super::token::TokenIssuer;
use crate::models::{NewUser, NewUserRecord, PublicUser};
use crate::repository::{StoreError, UserStore};

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenIssuer>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("timing-equalizer-not-a-password")?;
        Ok(Self {
            users,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenIssuer> {
        &self.tokens
    }

    /// Verifies `username`/`password` and issues a bearer token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(PublicUser, String), AuthError> {
        let stored = self
            .users
            .find_by_username(username)
            .await
            .map_err(infrastructure)?;

        let Some(user) = stored else {
            self.hasher
                .verify_blocking(password.to_owned(), self.dummy_hash.clone())
                .await?;
            log::info!("failed login attempt for unknown username {:?}", username);
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify_blocking(password.to_owned(), user.password_hash.clone())
            .await?;
        if !matches {
            log::info!("failed login attempt for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            log::info!("login refused for inactive user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, user.role).map_err(|e| {
            log::error!("token issuance failed for user {}: {}", user.id, e);
            AuthError::Infrastructure(e.to_string())
        })?;

        log::info!("user {} logged in", user.id);
        Ok((PublicUser::from(user), token))
    }

    /// Creates an account. The username/email pre-check is a fast path; the
    /// store's uniqueness constraint has the final word.
    pub async fn register(&self, new_user: NewUser) -> Result<PublicUser, AuthError> {
        new_user.validate()?;

        if self
            .users
            .find_by_username(&new_user.username)
            .await
            .map_err(infrastructure)?
            .is_some()
        {
            return Err(AuthError::DuplicateIdentity(DuplicateField::Username));
        }
        if self
            .users
            .find_by_email(&new_user.email)
            .await
            .map_err(infrastructure)?
            .is_some()
        {
            return Err(AuthError::DuplicateIdentity(DuplicateField::Email));
        }

        let NewUser {
            username,
            email,
            password,
            full_name,
            role,
        } = new_user;
        let password_hash = self.hasher.hash_blocking(password).await?;

        let created = self
            .users
            .create(NewUserRecord {
                username,
                email,
                password_hash,
                full_name,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(field) => AuthError::DuplicateIdentity(field),
                other => infrastructure(other),
            })?;

        log::info!("registered user {} with role {}", created.id, created.role);
        Ok(created.into())
    }
}

fn infrastructure(error: StoreError) -> AuthError {
    log::error!("credential store failure: {}", error);
    AuthError::Infrastructure(error.to_string())
}
