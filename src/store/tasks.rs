//! Resource store: tasks, always scoped to their owning user.
//!
//! Every read, update, and delete carries an `owner_id` predicate. A task that
//! exists but belongs to somebody else is indistinguishable from one that does
//! not exist at all.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, TaskPatch};

const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

pub async fn create(
    pool: &PgPool,
    owner_id: Uuid,
    description: &str,
    completed: bool,
) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, description, completed, owner_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(description)
    .bind(completed)
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Assembles the list query for the given filter. The owner predicate is
/// unconditional; filter values are bound, never spliced, and the sort column
/// comes from a fixed allow-list.
fn build_list_sql(filter: &TaskFilter) -> String {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");
    let mut param = 2;

    if filter.completed.is_some() {
        sql.push_str(&format!(" AND completed = ${param}"));
        param += 1;
    }

    sql.push_str(&format!(
        " ORDER BY {} {}",
        filter.sort.field.column(),
        if filter.sort.descending { "DESC" } else { "ASC" }
    ));

    if filter.limit.is_some() {
        sql.push_str(&format!(" LIMIT ${param}"));
        param += 1;
    }
    if filter.skip.is_some() {
        sql.push_str(&format!(" OFFSET ${param}"));
    }

    sql
}

/// Lists the owner's tasks, honoring filter, sort, and window. No matches is
/// an empty list, not an error.
pub async fn list(pool: &PgPool, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
    let sql = build_list_sql(filter);
    let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner_id);

    if let Some(completed) = filter.completed {
        query = query.bind(completed);
    }
    if let Some(limit) = filter.limit {
        query = query.bind(limit);
    }
    if let Some(skip) = filter.skip {
        query = query.bind(skip);
    }

    Ok(query.fetch_all(pool).await?)
}

pub async fn find(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}

/// Applies a validated patch to an owned task. Returns `None` when the task
/// does not exist for this owner.
pub async fn update(
    pool: &PgPool,
    owner_id: Uuid,
    id: Uuid,
    patch: &TaskPatch,
) -> Result<Option<Task>, AppError> {
    let Some(task) = find(pool, owner_id, id).await? else {
        return Ok(None);
    };

    let description = patch.description.as_deref().unwrap_or(&task.description);
    let completed = patch.completed.unwrap_or(task.completed);

    let updated = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET description = $1, completed = $2, updated_at = now() \
         WHERE id = $3 AND owner_id = $4 \
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(description)
    .bind(completed)
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

/// Deletes an owned task, returning the deleted record, or `None` when the
/// task does not exist for this owner.
pub async fn delete(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<Option<Task>, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}
