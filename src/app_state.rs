//! Everything the handlers share: the database, the session key and the live expense feed.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, store::ExpenseFeed};

/// Shared server state. Handlers take the parts they need through `FromRef`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts the session cookie.
    pub cookie_key: Key,
    /// Sessions expire after this long without a request.
    pub cookie_duration: Duration,
    /// Canonical timezone name used for "today" and new expense timestamps.
    pub local_timezone: String,
    /// The single SQLite connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// Pushes each user's latest expenses to the live chart streams.
    pub expense_feed: ExpenseFeed,
}

impl AppState {
    /// Create the tables in `db_connection` if needed and derive the cookie key from
    /// `cookie_secret`.
    ///
    /// # Errors
    /// Returns an error if the tables could not be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
            expense_feed: ExpenseFeed::new(),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie key from `secret`. The same secret always gives the same key, so
/// sessions survive restarts.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use crate::auth::count_users;

    use super::{AppState, create_cookie_key};

    #[test]
    fn new_initializes_database() {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "averysecretsecret",
            "Asia/Kolkata",
        )
        .unwrap();

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection), Ok(0));
    }

    #[test]
    fn same_secret_gives_same_key() {
        assert_eq!(
            create_cookie_key("foo").master(),
            create_cookie_key("foo").master()
        );
        assert_ne!(
            create_cookie_key("foo").master(),
            create_cookie_key("bar").master()
        );
    }
}
