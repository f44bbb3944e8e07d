pub mod task;
pub mod user;

pub use task::{Task, TaskPriority, TaskStatus, TaskWithOwner};
pub use user::{normalize_email, User, UserWithTasks};
