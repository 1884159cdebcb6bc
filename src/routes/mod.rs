pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::state::AppState;

/// Mounts every route. Registration, login and the health check are public;
/// the rest of `/api/v1` sits behind `AuthMiddleware`.
///
/// The public resources are registered before the protected scope so that
/// they match first.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(state.auth.clone())
            .app_data(state.users.clone())
            .app_data(state.tasks.clone())
            .app_data(state.policy.clone())
            .service(health::health)
            .service(auth::register)
            .service(auth::login)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware::new(state.tokens))
                    .service(
                        web::scope("/users")
                            .service(users::list_users)
                            .service(users::me)
                            .service(users::get_user)
                            .service(users::update_user)
                            .service(users::delete_user),
                    )
                    .service(
                        web::scope("/tasks")
                            .service(tasks::get_tasks)
                            .service(tasks::create_task)
                            .service(tasks::get_task)
                            .service(tasks::update_task)
                            .service(tasks::delete_task),
                    ),
            );
    }
}
