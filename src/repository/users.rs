use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, UserStore};
use crate::models::{NewUserRecord, UserRecord, UserUpdate};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, role, is_active, created_at, updated_at";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_one("email", email).await
    }

    async fn create(&self, user: NewUserRecord) -> Result<UserRecord, StoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, full_name, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(&self, id: i32, changes: &UserUpdate) -> Result<UserRecord, StoreError> {
        let sql = format!(
            "UPDATE users \
             SET email = COALESCE($1, email), \
                 full_name = COALESCE($2, full_name), \
                 role = COALESCE($3, role), \
                 is_active = COALESCE($4, is_active), \
                 updated_at = NOW() \
             WHERE id = $5 \
             RETURNING {}",
            USER_COLUMNS
        );
        let updated = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&changes.email)
            .bind(&changes.full_name)
            .bind(changes.role)
            .bind(changes.is_active)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}
