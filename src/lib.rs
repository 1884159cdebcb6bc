#![doc = "The `task_api` library crate."]
#![doc = ""]
#![doc = "Task and user resources over HTTP, with bcrypt-hashed credentials, HS256 bearer"]
#![doc = "tokens and a role-aware authorization gate. The binary (`main.rs`) loads"]
#![doc = "configuration, connects to Postgres and mounts `routes::configure`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use crate::error::AppError;
pub use crate::state::AppState;
