use actix_web::{get, post, web, HttpResponse, Responder};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use sqlx::SqlitePool;
use validator::{Validate, ValidationErrors};

use crate::auth::CurrentUser;
use crate::controllers::tasks;
use crate::error::AppError;
use crate::forms::{TaskForm, TaskStatusForm, STATUS_CHOICES};
use crate::models::{TaskStatus, User};
use crate::pages;
use crate::routes::redirect;

async fn render_dashboard(
    pool: &SqlitePool,
    user: &User,
    messages: &IncomingFlashMessages,
    status_error: Option<&str>,
) -> Result<HttpResponse, AppError> {
    let tasks = tasks::list_for_owner(pool, user.id).await?;
    let mut ctx = pages::base_context(messages, Some(user));
    ctx.insert("tasks", &tasks);
    ctx.insert("status_choices", &STATUS_CHOICES);
    if let Some(error) = status_error {
        ctx.insert("status_error", &error);
    }
    pages::render("dashboard.html", &ctx)
}

fn render_task_form(
    title: &str,
    form: &TaskForm,
    errors: &ValidationErrors,
    user: &User,
    messages: &IncomingFlashMessages,
) -> Result<HttpResponse, AppError> {
    let mut ctx = pages::base_context(messages, Some(user));
    ctx.insert("title", title);
    ctx.insert("fields", &form.fields(errors));
    pages::render("task_form.html", &ctx)
}

/// Dashboard: the authenticated user's own tasks, most recently updated
/// first, each with an inline status form.
#[get("/")]
pub async fn dashboard(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    render_dashboard(&pool, &user.0, &messages, None).await
}

/// Every task in the system, with owners. Read-only; no mutation links
/// are attached to other users' tasks.
#[get("/tasks/")]
pub async fn tasks_list(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let tasks = tasks::list_all(&pool).await?;
    let mut ctx = pages::base_context(&messages, Some(&user.0));
    ctx.insert("tasks", &tasks);
    pages::render("tasks_list.html", &ctx)
}

#[get("/tasks/new/")]
pub async fn task_create_form(
    user: CurrentUser,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    render_task_form(
        "New task",
        &TaskForm::default(),
        &ValidationErrors::new(),
        &user.0,
        &messages,
    )
}

/// Creates a task owned by the submitter.
///
/// ## Responses:
/// - `303 See Other`: redirect to the dashboard with a success message.
/// - `200 OK`: the form re-rendered with field errors; nothing was created.
#[post("/tasks/new/")]
pub async fn task_create(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    form: web::Form<TaskForm>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return render_task_form("New task", &form, &errors, &user.0, &messages);
    }

    tasks::create_from_form(&pool, user.0.id, &form).await?;
    FlashMessage::success("Task created.").send();
    Ok(redirect("/"))
}

#[get("/tasks/{id}/edit/")]
pub async fn task_edit_form(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_for_owner(&pool, user.0.id, task_id.into_inner()).await?;
    render_task_form(
        "Edit task",
        &TaskForm::from_task(&task),
        &ValidationErrors::new(),
        &user.0,
        &messages,
    )
}

/// Updates a task the requester owns.
///
/// ## Responses:
/// - `303 See Other`: redirect to the dashboard with an info message.
/// - `200 OK`: the form re-rendered with field errors; nothing changed.
/// - `404 Not Found`: missing id, or a task owned by someone else.
#[post("/tasks/{id}/edit/")]
pub async fn task_edit(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    form: web::Form<TaskForm>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_for_owner(&pool, user.0.id, task_id.into_inner()).await?;

    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return render_task_form("Edit task", &form, &errors, &user.0, &messages);
    }

    tasks::update_from_form(&pool, &task, &form).await?;
    FlashMessage::info("Task updated.").send();
    Ok(redirect("/"))
}

#[get("/tasks/{id}/delete/")]
pub async fn task_delete_confirm(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_for_owner(&pool, user.0.id, task_id.into_inner()).await?;
    let mut ctx = pages::base_context(&messages, Some(&user.0));
    ctx.insert("task", &task);
    pages::render("task_confirm_delete.html", &ctx)
}

#[post("/tasks/{id}/delete/")]
pub async fn task_delete(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_for_owner(&pool, user.0.id, task_id.into_inner()).await?;
    tasks::delete_task(&pool, &task).await?;
    FlashMessage::warning("Task deleted.").send();
    Ok(redirect("/"))
}

/// The status form only lives on the dashboard; a bare GET has nothing to
/// show, so it resolves the task (ownership check included) and bounces back.
#[get("/tasks/{id}/status/")]
pub async fn task_status_redirect(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    tasks::get_for_owner(&pool, user.0.id, task_id.into_inner()).await?;
    Ok(redirect("/"))
}

/// Status-only update, submitted from the inline select on the dashboard.
///
/// An invalid status re-renders the dashboard with the error in place,
/// matching every other form's behavior; no mutation occurs. Submitting the
/// task's current status succeeds and refreshes its updated timestamp.
#[post("/tasks/{id}/status/")]
pub async fn task_update_status(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    form: web::Form<TaskStatusForm>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let task = tasks::get_for_owner(&pool, user.0.id, task_id.into_inner()).await?;

    let status = match form.validate() {
        Ok(()) => TaskStatus::parse(&form.status),
        Err(_) => None,
    };
    let Some(status) = status else {
        return render_dashboard(&pool, &user.0, &messages, Some("Select a valid status.")).await;
    };

    tasks::update_status(&pool, &task, status).await?;
    FlashMessage::success("Status updated.").send();
    Ok(redirect("/"))
}
