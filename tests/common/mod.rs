#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{http::StatusCode, test};
use serde_json::json;
use task_api::config::AuthConfig;
use task_api::models::{NewUser, PublicUser, Role};
use task_api::repository::{MemoryTaskStore, MemoryUserStore};
use task_api::AppState;

pub const SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.to_string(),
        token_ttl: chrono::Duration::hours(24),
        bcrypt_cost: 4,
        allow_admin_registration: false,
    }
}

/// App state over fresh in-memory stores. The user store is returned too so
/// tests can inspect what was persisted.
pub fn memory_state() -> (AppState, Arc<MemoryUserStore>) {
    let tasks = Arc::new(MemoryTaskStore::new());
    let users = Arc::new(MemoryUserStore::cascading_to(tasks.clone()));
    let state = AppState::new(users.clone(), tasks, &auth_config())
    .expect("failed to build app state");
    (state, users)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Creates an administrator directly through the service, since the public
/// endpoint refuses self-assigned admin roles.
pub async fn create_admin(state: &AppState, username: &str) -> PublicUser {
    state
        .auth
        .register(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "AdminPass123!".to_string(),
            full_name: "Administrator".to_string(),
            role: Role::Admin,
        })
        .await
        .expect("failed to create admin")
}

pub async fn register<S, B>(app: &S, username: &str, email: &str, password: &str) -> PublicUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "registration of {} failed", username);
    test::read_body_json(resp).await
}

pub async fn login<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "login of {} failed", username);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["token"]
        .as_str()
        .expect("login response has no token")
        .to_string()
}

pub async fn register_and_login<S, B>(app: &S, username: &str) -> (PublicUser, String)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let password = "Password123!";
    let user = register(app, username, &format!("{}@example.com", username), password).await;
    let token = login(app, username, password).await;
    (user, token)
}
