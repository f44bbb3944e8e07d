//! Template rendering. Templates are embedded at compile time and registered
//! into one shared `Tera` instance, so the binary and the test suite render
//! the same pages regardless of working directory.

use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use lazy_static::lazy_static;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::AppError;
use crate::models::User;

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("_form_fields.html", include_str!("../templates/_form_fields.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("register.html", include_str!("../templates/register.html")),
            ("dashboard.html", include_str!("../templates/dashboard.html")),
            ("task_form.html", include_str!("../templates/task_form.html")),
            (
                "task_confirm_delete.html",
                include_str!("../templates/task_confirm_delete.html"),
            ),
            ("tasks_list.html", include_str!("../templates/tasks_list.html")),
            ("users_list.html", include_str!("../templates/users_list.html")),
            (
                "account_confirm_delete.html",
                include_str!("../templates/account_confirm_delete.html"),
            ),
        ])
        .expect("bundled templates are valid");
        tera
    };
}

/// A one-shot message ready for template consumption. `level` doubles as the
/// Bootstrap alert class suffix.
#[derive(Debug, Clone, Serialize)]
pub struct FlashView {
    pub level: &'static str,
    pub content: String,
}

/// Converts incoming flash messages to their render model.
pub fn flash_views(messages: &IncomingFlashMessages) -> Vec<FlashView> {
    messages
        .iter()
        .map(|message| FlashView {
            level: match message.level() {
                Level::Success => "success",
                Level::Info => "info",
                Level::Warning => "warning",
                Level::Error => "danger",
                Level::Debug => "secondary",
            },
            content: message.content().to_string(),
        })
        .collect()
}

/// Base context for a page: flash messages plus the logged-in user, if any.
pub fn base_context(messages: &IncomingFlashMessages, current_user: Option<&User>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("messages", &flash_views(messages));
    ctx.insert("current_user", &current_user);
    ctx
}

/// Renders a template to a 200 HTML response.
pub fn render(template: &str, ctx: &Context) -> Result<HttpResponse, AppError> {
    let body = TEMPLATES
        .render(template, ctx)
        .map_err(|e| AppError::InternalServerError(format!("Template error: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}
