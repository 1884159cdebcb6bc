use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use super::gate::Identity;
use crate::error::AppError;

fn identity_of(req: &HttpRequest) -> Result<Identity, AppError> {
    req.extensions().get::<Identity>().copied().ok_or_else(|| {
        // Only reachable when a handler is mounted outside `AuthMiddleware`.
        AppError::Unauthorized("Authentication required".to_string())
    })
}

/// The authenticated caller, as stored by `AuthMiddleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_of(req).map(AuthenticatedUser).map_err(Into::into))
    }
}

/// Like [`AuthenticatedUser`], but rejects non-admin callers with 403.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Identity);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = identity_of(req).and_then(|identity| {
            if identity.is_admin() {
                Ok(AdminUser(identity))
            } else {
                log::info!("user {} denied access to {}", identity.user_id, req.path());
                Err(AppError::Forbidden("Administrator role required".to_string()))
            }
        });
        ready(result.map_err(Into::into))
    }
}
