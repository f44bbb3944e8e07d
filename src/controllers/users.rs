use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::auth::hash_password;
use crate::error::AppError;
use crate::forms::RegistrationForm;
use crate::models::{normalize_email, Task, User, UserWithTasks};

const USER_COLUMNS: &str =
    "id, email, full_name, password_hash, is_active, is_staff, is_superuser, created_at";

pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Looks a user up by email. The address is normalized first so lookups match
/// what registration stored.
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn email_taken(pool: &SqlitePool, email: &str) -> Result<bool, AppError> {
    let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    Ok(existing.is_some())
}

/// Persists a new user from a validated registration form: normalizes the
/// email, hashes the password, and stores the framework-standard flags with
/// their defaults.
pub async fn register_user_from_form(
    pool: &SqlitePool,
    form: &RegistrationForm,
) -> Result<User, AppError> {
    let password_hash = hash_password(&form.password1)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, full_name, password_hash, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(normalize_email(&form.email))
    .bind(&form.full_name)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// All users, each with their tasks (most recently updated first, matching
/// the default ordering everywhere else).
pub async fn list_with_tasks(pool: &SqlitePool) -> Result<Vec<UserWithTasks>, AppError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, description, priority, status, owner_id, created_at, updated_at
         FROM tasks ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;

    let mut by_owner: HashMap<i64, Vec<Task>> = HashMap::new();
    for task in tasks {
        by_owner.entry(task.owner_id).or_default().push(task);
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let tasks = by_owner.remove(&user.id).unwrap_or_default();
            UserWithTasks { user, tasks }
        })
        .collect())
}

/// Deletes the user row. The foreign key cascade removes all of their tasks
/// in the same statement. Session teardown is the caller's responsibility.
pub async fn delete_account(pool: &SqlitePool, user_id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
