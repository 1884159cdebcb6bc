use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::auth::errors::DuplicateField;
use crate::models::{NewUserRecord, Task, TaskInput, TaskQuery, UserRecord, UserUpdate};

#[derive(Default)]
struct UserTable {
    next_id: i32,
    rows: Vec<UserRecord>,
}

impl UserTable {
    fn conflict(&self, username: Option<&str>, email: Option<&str>, skip: Option<i32>) -> Option<DuplicateField> {
        self.rows
            .iter()
            .filter(|u| Some(u.id) != skip)
            .find_map(|u| {
                if username == Some(u.username.as_str()) {
                    Some(DuplicateField::Username)
                } else if email == Some(u.email.as_str()) {
                    Some(DuplicateField::Email)
                } else {
                    None
                }
            })
    }
}

/// A [`UserStore`] held in process memory.
///
/// The uniqueness check and the insert happen under one write lock, giving the
/// same guarantee as the unique constraints on the `users` table. When linked
/// to a [`MemoryTaskStore`], deleting a user deletes their tasks as
/// `ON DELETE CASCADE` does.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
    tasks: Option<Arc<MemoryTaskStore>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cascading_to(tasks: Arc<MemoryTaskStore>) -> Self {
        Self {
            table: RwLock::default(),
            tasks: Some(tasks),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUserRecord) -> Result<UserRecord, StoreError> {
        let mut table = self.table.write().await;
        if let Some(field) = table.conflict(Some(&user.username), Some(&user.email), None) {
            return Err(StoreError::Duplicate(field));
        }

        table.next_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: table.next_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i32, changes: &UserUpdate) -> Result<UserRecord, StoreError> {
        let mut table = self.table.write().await;
        if let Some(field) = table.conflict(None, changes.email.as_deref(), Some(id)) {
            return Err(StoreError::Duplicate(field));
        }

        let record = table
            .rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        if let Some(email) = &changes.email {
            record.email = email.clone();
        }
        if let Some(full_name) = &changes.full_name {
            record.full_name = full_name.clone();
        }
        if let Some(role) = changes.role {
            record.role = role;
        }
        if let Some(is_active) = changes.is_active {
            record.is_active = is_active;
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        if table.rows.len() == before {
            return Err(StoreError::NotFound);
        }
        if let Some(tasks) = &self.tasks {
            tasks.rows.write().await.retain(|t| t.user_id != id);
        }
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        let table = self.table.read().await;
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(table.rows.iter().skip(offset).take(limit).cloned().collect())
    }
}

/// A [`TaskStore`] held in process memory.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self, owner_id: i32, query: &TaskQuery) -> Result<Vec<Task>, StoreError> {
        let rows = self.rows.read().await;
        let mut tasks: Vec<Task> = rows
            .iter()
            .filter(|t| t.user_id == owner_id && query.matches(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn get(&self, owner_id: i32, id: Uuid) -> Result<Option<Task>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|t| t.id == id && t.user_id == owner_id)
            .cloned())
    }

    async fn create(&self, task: Task) -> Result<Task, StoreError> {
        self.rows.write().await.push(task.clone());
        Ok(task)
    }

    async fn update(
        &self,
        owner_id: i32,
        id: Uuid,
        input: &TaskInput,
    ) -> Result<Option<Task>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(task) = rows.iter_mut().find(|t| t.id == id && t.user_id == owner_id) else {
            return Ok(None);
        };
        task.title = input.title.clone();
        task.description = input.description.clone();
        task.status = input.status;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete(&self, owner_id: i32, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.user_id == owner_id));
        Ok(rows.len() != before)
    }
}
