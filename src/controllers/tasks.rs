use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::forms::TaskForm;
use crate::models::{Task, TaskPriority, TaskStatus, TaskWithOwner};

const TASK_COLUMNS: &str =
    "id, title, description, priority, status, owner_id, created_at, updated_at";

/// Tasks owned by the given user, most recently updated first.
pub async fn list_for_owner(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Task>, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ? ORDER BY updated_at DESC"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

/// Every task in the system with its owner's display fields attached,
/// most recently updated first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TaskWithOwner>, AppError> {
    let tasks = sqlx::query_as::<_, TaskWithOwner>(
        "SELECT t.id, t.title, t.description, t.priority, t.status, t.owner_id,
                t.created_at, t.updated_at,
                u.email AS owner_email, u.full_name AS owner_name
         FROM tasks t
         JOIN users u ON u.id = t.owner_id
         ORDER BY t.updated_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

/// The shared ownership-scoped lookup: resolves a task by (id, owner) pair.
/// A task id belonging to another user is indistinguishable from a missing
/// one; both return `AppError::NotFound`.
pub async fn get_for_owner(
    pool: &SqlitePool,
    owner_id: i64,
    task_id: i64,
) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND owner_id = ?"
    ))
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    task.ok_or_else(|| AppError::NotFound("Task not found".into()))
}

fn parse_priority(value: &str) -> Result<TaskPriority, AppError> {
    TaskPriority::parse(value)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid priority: {}", value)))
}

fn parse_status(value: &str) -> Result<TaskStatus, AppError> {
    TaskStatus::parse(value)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid status: {}", value)))
}

/// Creates a task from a validated form, owned by the given user.
pub async fn create_from_form(
    pool: &SqlitePool,
    owner_id: i64,
    form: &TaskForm,
) -> Result<Task, AppError> {
    let now = Utc::now();
    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (title, description, priority, status, owner_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(&form.title)
    .bind(&form.description)
    .bind(parse_priority(&form.priority)?)
    .bind(parse_status(&form.status)?)
    .bind(owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Rewrites an already-resolved task from a validated form. The owner never
/// changes; `updated_at` always does.
pub async fn update_from_form(
    pool: &SqlitePool,
    task: &Task,
    form: &TaskForm,
) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = ?, description = ?, priority = ?, status = ?, updated_at = ?
         WHERE id = ? AND owner_id = ?
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(&form.title)
    .bind(&form.description)
    .bind(parse_priority(&form.priority)?)
    .bind(parse_status(&form.status)?)
    .bind(Utc::now())
    .bind(task.id)
    .bind(task.owner_id)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Sets the status of an already-resolved task. Re-submitting the current
/// status is fine; only `updated_at` moves.
pub async fn update_status(
    pool: &SqlitePool,
    task: &Task,
    status: TaskStatus,
) -> Result<Task, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ? AND owner_id = ?
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(status)
    .bind(Utc::now())
    .bind(task.id)
    .bind(task.owner_id)
    .fetch_one(pool)
    .await?;

    Ok(task)
}

/// Deletes an already-resolved task.
pub async fn delete_task(pool: &SqlitePool, task: &Task) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
        .bind(task.id)
        .bind(task.owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(())
}
