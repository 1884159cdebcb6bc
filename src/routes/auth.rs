use crate::{
    auth::{AuthService, LoginResponse},
    error::AppError,
    models::{Credentials, NewUser, PublicUser, Role},
    state::RegistrationPolicy,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Returns `201` with the public view of the account. A duplicate username or
/// email is `409`, invalid input `422`. Self-assigning `ADMIN` is refused
/// unless the deployment allows it.
#[post("/api/v1/users/register")]
pub async fn register(
    service: web::Data<AuthService>,
    policy: web::Data<RegistrationPolicy>,
    payload: web::Json<NewUser>,
) -> Result<impl Responder, AppError> {
    let new_user = payload.into_inner();

    if new_user.role == Role::Admin && !policy.allow_admin_registration {
        return Err(AppError::ValidationError(
            "role: ADMIN cannot be self-assigned".into(),
        ));
    }

    let user: PublicUser = service.register(new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Any credential failure is the same `401 Invalid credentials`.
#[post("/api/v1/users/login")]
pub async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let (user, token) = service.login(&payload.username, &payload.password).await?;
    Ok(HttpResponse::Ok().json(LoginResponse::new(user, token, service.tokens())))
}
