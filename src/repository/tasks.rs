use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::models::{Task, TaskInput, TaskQuery};

const TASK_COLUMNS: &str = "id, title, description, status, user_id, created_at, updated_at";

/// `%term%` with the term's own `\`, `%` and `_` escaped, so the search matches
/// literally like [`TaskQuery::matches`].
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self, owner_id: i32, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        // Optional filters are appended with consecutive placeholders.
        let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
        let mut next_param = 2;

        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", next_param));
            next_param += 1;
        }
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        if search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${0} ESCAPE '\\' OR description ILIKE ${0} ESCAPE '\\')",
                next_param
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut statement = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
        if let Some(status) = query.status {
            statement = statement.bind(status);
        }
        if let Some(pattern) = search {
            statement = statement.bind(pattern);
        }

        Ok(statement.fetch_all(&self.pool).await?)
    }

    async fn get(&self, owner_id: i32, id: Uuid) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, status, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.user_id)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update(
        &self,
        owner_id: i32,
        id: Uuid,
        input: &TaskInput,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks \
             SET title = $1, description = $2, status = $3, updated_at = NOW() \
             WHERE id = $4 AND user_id = $5 \
             RETURNING {}",
            TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, owner_id: i32, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
