pub mod extractors;
pub mod password;

use actix_session::Session;

use crate::error::AppError;

pub use extractors::CurrentUser;
pub use password::{hash_password, verify_password};

/// Session key holding the authenticated user's id.
pub const USER_ID_KEY: &str = "user_id";

/// Establishes a session for the given user. The session id is rotated so a
/// pre-login cookie can not be replayed as an authenticated one.
pub fn log_in(session: &Session, user_id: i64) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_ID_KEY, user_id)
        .map_err(|e| AppError::InternalServerError(format!("Failed to store session: {}", e)))
}

/// Clears the session entirely, ending the login.
pub fn log_out(session: &Session) {
    session.purge();
}

/// Reads the logged-in user id, if any, from the session.
pub fn session_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID_KEY).ok().flatten()
}
