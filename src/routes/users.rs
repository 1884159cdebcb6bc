use crate::{
    auth::{AdminUser, AuthenticatedUser},
    error::AppError,
    models::{Pagination, PublicUser, UserUpdate},
    repository::UserStore,
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists accounts, `ADMIN` only.
///
/// ## Query Parameters:
/// - `page` (optional, default 1)
/// - `page_size` (optional, default 10, at most 100)
#[get("")]
pub async fn list_users(
    _admin: AdminUser,
    store: web::Data<dyn UserStore>,
    pagination: web::Query<Pagination>,
) -> Result<impl Responder, AppError> {
    let users: Vec<PublicUser> = store
        .list(pagination.offset(), pagination.limit())
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// The caller's own account.
#[get("/me")]
pub async fn me(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn UserStore>,
) -> Result<impl Responder, AppError> {
    let user = store
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// One account, visible to its owner and to administrators.
#[get("/{id}")]
pub async fn get_user(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn UserStore>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    if !identity.can_act_for(user_id) {
        return Err(AppError::Forbidden("Cannot access another user".into()));
    }

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// Partial update of an account.
///
/// Owners may change their email and full name; `role` and `is_active`
/// need `ADMIN`. An email held by another account is `409`.
#[put("/{id}")]
pub async fn update_user(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn UserStore>,
    user_id: web::Path<i32>,
    payload: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let user_id = user_id.into_inner();

    if !identity.can_act_for(user_id) {
        return Err(AppError::Forbidden("Cannot modify another user".into()));
    }
    if payload.is_privileged() && !identity.is_admin() {
        return Err(AppError::Forbidden(
            "Only administrators can change role or active status".into(),
        ));
    }

    if let Some(email) = &payload.email {
        if let Some(owner) = store.find_by_email(email).await? {
            if owner.id != user_id {
                return Err(AppError::Conflict("email already exists".into()));
            }
        }
    }

    let updated = store.update(user_id, &payload).await?;
    log::info!("user {} updated by {}", updated.id, identity.user_id);
    Ok(HttpResponse::Ok().json(PublicUser::from(updated)))
}

/// Deletes an account, `ADMIN` only. Its tasks go with it.
#[delete("/{id}")]
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    store: web::Data<dyn UserStore>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user_id = user_id.into_inner();
    store.delete(user_id).await?;

    log::info!("user {} deleted by {}", user_id, admin.user_id);
    Ok(HttpResponse::NoContent().finish())
}
