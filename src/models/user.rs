use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Usernames: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Role carried by every account and embedded in issued tokens.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// Administrator, allowed through role-gated endpoints.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("USER"),
            Role::Admin => f.write_str("ADMIN"),
        }
    }
}

/// A user row as stored in the `users` table, including the password hash.
///
/// Only the storage layer and the authentication service see this type;
/// everything that leaves the process goes through [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The client-facing view of an account. Never contains the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            full_name: record.full_name,
            role: record.role,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Registration payload. The password is plaintext and only lives until it is hashed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    /// 3 to 50 characters, alphanumeric, underscores or hyphens.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// bcrypt only looks at the first 72 bytes, so longer input is rejected.
    #[validate(length(min = 8, max = 72))]
    pub password: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
}

/// What the storage layer receives on registration: the hash, never the password.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

/// Login payload.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 72))]
    pub password: String,
}

/// Partial update of an account. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Whether the update touches fields only an administrator may change.
    pub fn is_privileged(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

/// `?page=&page_size=` for listings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: i64 = 10;
    pub const MAX_PAGE_SIZE: i64 = 100;

    pub fn limit(&self) -> i64 {
        match self.page_size {
            Some(size) if size >= 1 => size.min(Self::MAX_PAGE_SIZE),
            _ => Self::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn offset(&self) -> i64 {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        (page - 1) * self.limit()
    }
}
