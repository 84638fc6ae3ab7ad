use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{StoreResult, TaskStore, UserStore};
use crate::models::{NewTask, NewUser, Task, TaskFilter, User};

const USER_COLUMNS: &str = "id, username, password, name, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, text, category, date, priority_level, completed, user_id, created_at, updated_at";

/// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: &NewUser) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, password, name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

/// PostgreSQL-backed task store, reading and writing the `todos` table.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Builds the owner-scoped listing query. Each present filter appends one `AND` predicate.
pub(crate) fn filtered_query<'a>(
    owner: i64,
    limit: i64,
    offset: i64,
    filter: &'a TaskFilter,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM todos WHERE user_id = ",
        TASK_COLUMNS
    ));
    builder.push_bind(owner);

    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(priority) = filter.priority_level {
        builder.push(" AND priority_level = ").push_bind(priority);
    }
    if let Some(keyword) = &filter.keyword {
        builder
            .push(" AND text ILIKE ")
            .push_bind(format!("%{}%", escape_like(keyword)))
            .push(" ESCAPE '\\'");
    }

    builder
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    builder
}

/// Escapes LIKE metacharacters so the keyword matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn fetch_page(&self, limit: i64, offset: i64) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM todos ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            TASK_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn fetch_by_id(&self, id: i64) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn fetch_filtered(
        &self,
        owner: i64,
        limit: i64,
        offset: i64,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Task>> {
        let tasks = filtered_query(owner, limit, offset, filter)
            .build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    async fn list_distinct_categories(&self) -> StoreResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM todos")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn insert(&self, task: &NewTask) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO todos (text, category, date, priority_level, completed, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(&task.text)
        .bind(&task.category)
        .bind(task.date)
        .bind(task.priority_level)
        .bind(task.completed)
        .bind(task.user_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, task: &Task) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE todos
             SET text = $1, category = $2, date = $3, priority_level = $4, completed = $5, updated_at = $6
             WHERE id = $7 AND user_id = $8",
        )
        .bind(&task.text)
        .bind(&task.category)
        .bind(task.date)
        .bind(task.priority_level)
        .bind(task.completed)
        .bind(task.updated_at)
        .bind(task.id)
        .bind(task.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64, owner: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
