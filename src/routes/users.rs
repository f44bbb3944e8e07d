use actix_session::Session;
use actix_web::{get, post, web, Responder};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use sqlx::SqlitePool;

use crate::auth::{self, CurrentUser};
use crate::controllers::users;
use crate::error::AppError;
use crate::pages;
use crate::routes::redirect;

/// Every user in the system with their tasks.
#[get("/users/")]
pub async fn users_list(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let listing = users::list_with_tasks(&pool).await?;
    let mut ctx = pages::base_context(&messages, Some(&user.0));
    ctx.insert("users", &listing);
    pages::render("users_list.html", &ctx)
}

#[get("/account/delete/")]
pub async fn account_delete_confirm(
    user: CurrentUser,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let ctx = pages::base_context(&messages, Some(&user.0));
    pages::render("account_confirm_delete.html", &ctx)
}

/// Deletes the requester's own account: the session ends first, then the
/// user row goes, taking every owned task with it (cascade).
#[post("/account/delete/")]
pub async fn account_delete(
    pool: web::Data<SqlitePool>,
    user: CurrentUser,
    session: Session,
) -> Result<impl Responder, AppError> {
    auth::log_out(&session);
    users::delete_account(&pool, user.0.id).await?;
    FlashMessage::warning("Account deleted.").send();
    Ok(redirect("/register/"))
}
