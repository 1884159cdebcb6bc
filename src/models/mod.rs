pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskQuery, TaskStatus};
pub use user::{
    Credentials, NewUser, NewUserRecord, Pagination, PublicUser, Role, UserRecord, UserUpdate,
};
