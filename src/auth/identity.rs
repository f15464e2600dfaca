//! Resolves the signed-in user from a request's cookies.

use axum_extra::extract::PrivateCookieJar;
use rusqlite::Connection;

use crate::{
    Error,
    auth::{UserID, cookie::get_token_from_cookies, get_user_by_id},
};

/// The identity of the user behind the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedInUser {
    pub id: UserID,
    pub email: String,
    pub verified: bool,
}

/// Get the user whose session cookie is in `jar`.
///
/// Returns `Ok(None)` when there is no valid session, including when the
/// session belongs to an account that has since been deleted.
///
/// # Errors
///
/// Returns an error if the database could not be queried.
pub fn current_user(
    jar: &PrivateCookieJar,
    connection: &Connection,
) -> Result<Option<SignedInUser>, Error> {
    let Ok(token) = get_token_from_cookies(jar) else {
        return Ok(None);
    };

    match get_user_by_id(token.user_id, connection) {
        Ok(user) => Ok(Some(SignedInUser {
            id: user.id,
            email: user.email,
            verified: user.email_verified,
        })),
        Err(Error::NotFound) => Ok(None),
        Err(error) => Err(error),
    }
}
