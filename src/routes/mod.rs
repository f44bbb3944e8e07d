pub mod auth;
pub mod tasks;
pub mod users;

use actix_web::{http::header, web, HttpResponse};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::register_form)
        .service(auth::register)
        .service(tasks::dashboard)
        .service(tasks::tasks_list)
        .service(tasks::task_create_form)
        .service(tasks::task_create)
        .service(tasks::task_edit_form)
        .service(tasks::task_edit)
        .service(tasks::task_delete_confirm)
        .service(tasks::task_delete)
        .service(tasks::task_status_redirect)
        .service(tasks::task_update_status)
        .service(users::users_list)
        .service(users::account_delete_confirm)
        .service(users::account_delete);
}

/// See-other redirect; every successful mutation ends in one of these.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
