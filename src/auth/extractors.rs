use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::SqlitePool;

use crate::auth;
use crate::controllers::users;
use crate::error::AppError;
use crate::models::User;

/// Extracts the authenticated user for the current request.
///
/// Reads the user id from the session cookie and loads the matching row.
/// Anonymous requests, and sessions pointing at a user that no longer exists
/// (deleted account), fail with `AppError::LoginRequired`, which responds
/// with a redirect to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let session = req.get_session();
            let user_id = match auth::session_user_id(&session) {
                Some(user_id) => user_id,
                None => return Err(AppError::LoginRequired.into()),
            };

            let pool = req
                .app_data::<web::Data<SqlitePool>>()
                .ok_or_else(|| {
                    AppError::InternalServerError("Database pool missing from app data".into())
                })?;

            match users::find_by_id(pool, user_id).await? {
                Some(user) => Ok(CurrentUser(user)),
                None => {
                    // Stale cookie for a deleted account.
                    session.purge();
                    Err(AppError::LoginRequired.into())
                }
            }
        })
    }
}
