//!
//! # Forms
//!
//! Per-operation form schemas: registration, login, task edit and the
//! status-only edit. Each form is a `serde`-deserializable struct with
//! `validator` derives, plus a `fields` method that produces the render model
//! consumed by the shared `_form_fields.html` template partial.
//!
//! Field styling is a cross-cutting concern shared by every form, so it lives
//! in one reusable function (`apply_field_styles`) applied after a field list
//! is built, rather than in any per-form code.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{Task, TaskPriority, TaskStatus};

/// (value, label) pairs for the priority select.
pub const PRIORITY_CHOICES: &[(&str, &str)] =
    &[("low", "Low"), ("medium", "Medium"), ("high", "High")];

/// (value, label) pairs for the status select.
pub const STATUS_CHOICES: &[(&str, &str)] = &[
    ("todo", "To do"),
    ("in_progress", "In progress"),
    ("done", "Done"),
];

/// One option of a select widget.
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Render model for a single form field. Templates iterate over these
/// instead of knowing each form's shape.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    /// One of "text", "email", "password", "textarea", "select".
    pub widget: &'static str,
    pub value: String,
    pub choices: Vec<Choice>,
    pub errors: Vec<String>,
    pub css_class: String,
}

impl FormField {
    fn input(name: &'static str, label: &'static str, widget: &'static str, value: &str) -> Self {
        Self {
            name,
            label,
            widget,
            value: value.to_string(),
            choices: Vec::new(),
            errors: Vec::new(),
            css_class: String::new(),
        }
    }

    fn select(
        name: &'static str,
        label: &'static str,
        choices: &[(&'static str, &'static str)],
        current: &str,
    ) -> Self {
        Self {
            name,
            label,
            widget: "select",
            value: current.to_string(),
            choices: choices
                .iter()
                .map(|(value, label)| Choice {
                    value,
                    label,
                    selected: *value == current,
                })
                .collect(),
            errors: Vec::new(),
            css_class: String::new(),
        }
    }
}

/// Assigns the display class every field gets: `form-select` for select
/// widgets, `form-control` for everything else.
pub fn apply_field_styles(fields: &mut [FormField]) {
    for field in fields.iter_mut() {
        field.css_class = if field.widget == "select" {
            "form-select"
        } else {
            "form-control"
        }
        .to_string();
    }
}

/// Copies the messages for each field out of a `ValidationErrors` and applies
/// the shared styling. Every form's `fields` method funnels through here.
fn finish_fields(mut fields: Vec<FormField>, errors: &ValidationErrors) -> Vec<FormField> {
    let by_field = errors.field_errors();
    for field in fields.iter_mut() {
        if let Some(field_errors) = by_field.get(field.name) {
            field.errors = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid value for {}.", field.label),
                })
                .collect();
        }
    }
    apply_field_styles(&mut fields);
    fields
}

/// Builds a field-level error with a fixed message. Also used by handlers
/// that attach errors the schema cannot know about (duplicate email).
pub fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    match TaskPriority::parse(value) {
        Some(_) => Ok(()),
        None => Err(validation_error("invalid_choice", "Select a valid priority.")),
    }
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    match TaskStatus::parse(value) {
        Some(_) => Ok(()),
        None => Err(validation_error("invalid_choice", "Select a valid status.")),
    }
}

/// Minimum password strength: at least 8 characters and not entirely numeric.
fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < 8 {
        return Err(validation_error(
            "password_too_short",
            "Password must contain at least 8 characters.",
        ));
    }
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return Err(validation_error(
            "password_entirely_numeric",
            "Password cannot be entirely numeric.",
        ));
    }
    Ok(())
}

/// Registration form: display name, email and a password entered twice.
/// Email uniqueness is enforced at registration time, not here.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150, message = "Full name is required (150 characters max)."))]
    pub full_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(custom = "validate_password_strength")]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "The two password fields do not match."))]
    pub password2: String,
}

impl RegistrationForm {
    pub fn empty() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            password1: String::new(),
            password2: String::new(),
        }
    }

    /// Render model. Password values are never echoed back.
    pub fn fields(&self, errors: &ValidationErrors) -> Vec<FormField> {
        finish_fields(
            vec![
                FormField::input("full_name", "Full name", "text", &self.full_name),
                FormField::input("email", "Email", "email", &self.email),
                FormField::input("password1", "Password", "password", ""),
                FormField::input("password2", "Confirm password", "password", ""),
            ],
            errors,
        )
    }
}

/// Task create/edit form. Priority and status arrive as strings and are
/// checked against the enumerations; controllers parse them after validation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, max = 200, message = "Title is required (200 characters max)."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "validate_priority")]
    pub priority: String,
    #[validate(custom = "validate_status")]
    pub status: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: TaskPriority::Medium.as_str().to_string(),
            status: TaskStatus::Todo.as_str().to_string(),
        }
    }
}

impl TaskForm {
    /// Pre-fills the form from an existing task, for the edit page.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority.as_str().to_string(),
            status: task.status.as_str().to_string(),
        }
    }

    pub fn fields(&self, errors: &ValidationErrors) -> Vec<FormField> {
        finish_fields(
            vec![
                FormField::input("title", "Title", "text", &self.title),
                FormField::input("description", "Description", "textarea", &self.description),
                FormField::select("priority", "Priority", PRIORITY_CHOICES, &self.priority),
                FormField::select("status", "Status", STATUS_CHOICES, &self.status),
            ],
            errors,
        )
    }
}

/// Status-only edit, submitted from the inline select on the dashboard.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskStatusForm {
    #[validate(custom = "validate_status")]
    pub status: String,
}

/// Login form. Presence only; credential checking happens in the handler.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl LoginForm {
    pub fn empty() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
        }
    }

    pub fn fields(&self, errors: &ValidationErrors) -> Vec<FormField> {
        finish_fields(
            vec![
                FormField::input("email", "Email", "email", &self.email),
                FormField::input("password", "Password", "password", ""),
            ],
            errors,
        )
    }
}
