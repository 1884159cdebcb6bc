use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskQuery},
    repository::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Retrieves the caller's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): `TODO`, `IN_PROGRESS` or `DONE`.
/// - `search` (optional): case-insensitive match on title or description.
#[get("")]
pub async fn get_tasks(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn TaskStore>,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = store.list(identity.user_id, &query).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller. `201` with the stored task.
#[post("")]
pub async fn create_task(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn TaskStore>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = store
        .create(Task::new(payload.into_inner(), identity.user_id))
        .await?;
    Ok(HttpResponse::Created().json(task))
}

/// Another user's task is reported as `404`, not `403`.
#[get("/{id}")]
pub async fn get_task(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = store
        .get(identity.user_id, task_id.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/{id}")]
pub async fn update_task(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let task = store
        .update(identity.user_id, task_id.into_inner(), &payload)
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// `204` on success.
#[delete("/{id}")]
pub async fn delete_task(
    AuthenticatedUser(identity): AuthenticatedUser,
    store: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    if !store.delete(identity.user_id, task_id.into_inner()).await? {
        return Err(not_found());
    }
    Ok(HttpResponse::NoContent().finish())
}
