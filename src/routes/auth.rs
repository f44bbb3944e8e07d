use actix_session::Session;
use actix_web::{get, post, route, web, HttpResponse, Responder};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use sqlx::SqlitePool;
use validator::{Validate, ValidationErrors};

use crate::auth::{self, verify_password};
use crate::controllers::users;
use crate::error::AppError;
use crate::forms::{validation_error, LoginForm, RegistrationForm};
use crate::pages;
use crate::routes::redirect;

fn render_login(
    form: &LoginForm,
    errors: &ValidationErrors,
    form_error: Option<&str>,
    messages: &IncomingFlashMessages,
) -> Result<HttpResponse, AppError> {
    let mut ctx = pages::base_context(messages, None);
    ctx.insert("fields", &form.fields(errors));
    if let Some(error) = form_error {
        ctx.insert("form_error", &error);
    }
    pages::render("login.html", &ctx)
}

fn render_register(
    form: &RegistrationForm,
    errors: &ValidationErrors,
    messages: &IncomingFlashMessages,
) -> Result<HttpResponse, AppError> {
    let mut ctx = pages::base_context(messages, None);
    ctx.insert("fields", &form.fields(errors));
    pages::render("register.html", &ctx)
}

/// Login form. Already-authenticated users are sent to the dashboard.
#[get("/login/")]
pub async fn login_form(
    session: Session,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    if auth::session_user_id(&session).is_some() {
        return Ok(redirect("/"));
    }
    render_login(&LoginForm::empty(), &ValidationErrors::new(), None, &messages)
}

/// Checks the submitted credentials and starts a session.
///
/// A wrong email is indistinguishable from a wrong password; both re-render
/// the form with the same message.
#[post("/login/")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    session: Session,
    form: web::Form<LoginForm>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return render_login(&form, &errors, None, &messages);
    }

    if let Some(user) = users::find_by_email(&pool, &form.email).await? {
        if verify_password(&form.password, &user.password_hash)? {
            auth::log_in(&session, user.id)?;
            return Ok(redirect("/"));
        }
    }

    render_login(
        &form,
        &ValidationErrors::new(),
        Some("Please enter a correct email and password."),
        &messages,
    )
}

/// Ends the session and returns to the login form. Accepts GET as well so a
/// plain navbar link works.
#[route("/logout/", method = "GET", method = "POST")]
pub async fn logout(session: Session) -> impl Responder {
    auth::log_out(&session);
    FlashMessage::info("You have been logged out.").send();
    redirect("/login/")
}

#[get("/register/")]
pub async fn register_form(messages: IncomingFlashMessages) -> Result<impl Responder, AppError> {
    render_register(&RegistrationForm::empty(), &ValidationErrors::new(), &messages)
}

/// Creates the account and logs the new user in right away.
///
/// A duplicate email surfaces as a field error on the form, the same way
/// schema-level validation failures do.
#[post("/register/")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    session: Session,
    form: web::Form<RegistrationForm>,
    messages: IncomingFlashMessages,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return render_register(&form, &errors, &messages);
    }

    if users::email_taken(&pool, &form.email).await? {
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            validation_error("unique", "A user with this email already exists."),
        );
        return render_register(&form, &errors, &messages);
    }

    let user = users::register_user_from_form(&pool, &form).await?;
    auth::log_in(&session, user.id)?;
    FlashMessage::success("Account created, welcome!").send();
    Ok(redirect("/"))
}
