//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way to
//! turn failure conditions into user-facing responses.
//!
//! `AppError` implements `actix_web::error::ResponseError`. Because every page
//! in this application is server-rendered HTML, errors are converted into
//! either a redirect (anonymous access to a protected page sends the browser
//! to the login form) or a minimal HTML error page. `From` implementations for
//! `sqlx::Error`, `validator::ValidationErrors` and `bcrypt::BcryptError`
//! allow handlers to use the `?` operator throughout.

use actix_web::{error::ResponseError, http::header, http::StatusCode, HttpResponse};
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// An anonymous request hit a route that requires authentication.
    /// Responds with a redirect to the login page.
    LoginRequired,
    /// A requested resource does not exist or is not owned by the requester
    /// (HTTP 404). Ownership misses deliberately look identical to missing
    /// rows.
    NotFound(String),
    /// Input failed validation after form-level checks should have caught it
    /// (HTTP 422). Normal validation failures never reach this variant; they
    /// re-render the originating form instead.
    ValidationError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::LoginRequired => write!(f, "Login required"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

fn error_page(title: &str, detail: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title></head><body><main class=\"container\">\
         <h1>{title}</h1><p>{detail}</p><p><a href=\"/\">Back to dashboard</a></p>\
         </main></body></html>"
    )
}

/// Converts `AppError` variants into HTTP responses.
///
/// `LoginRequired` becomes a redirect to `/login/` so that protected pages
/// behave like the rest of the application instead of returning a bare 401.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::LoginRequired => StatusCode::SEE_OTHER,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::LoginRequired => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/login/"))
                .finish(),
            AppError::NotFound(msg) => HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(error_page("Not found", msg)),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity()
                .content_type("text/html; charset=utf-8")
                .body(error_page("Invalid input", msg)),
            // Database details stay out of the response body.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                HttpResponse::InternalServerError()
                    .content_type("text/html; charset=utf-8")
                    .body(error_page("Something went wrong", "Please try again later."))
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `AppError::NotFound`; everything else becomes
/// `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
