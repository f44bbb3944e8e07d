use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::Task;

/// A registered account. The email address doubles as the login identifier;
/// there is no separate username.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    /// bcrypt hash. Never rendered; skipped during serialization so it can
    /// not leak into a template context.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with their tasks, for the users listing page.
#[derive(Debug, Serialize)]
pub struct UserWithTasks {
    pub user: User,
    pub tasks: Vec<Task>,
}

/// Lower-cases the domain part of an email address, leaving the local part
/// untouched. Applied before any lookup or insert so that the unique
/// constraint on `users.email` compares like with like.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
