//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash, category::seed_default_categories};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the database.
    pub id: UserID,
    /// Stored trimmed and lowercase.
    pub email: String,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
    /// Whether the email address has been confirmed. Nothing sets this yet.
    pub email_verified: bool,
    /// Whether expenses can be assigned to a bank.
    pub track_banks: bool,
}

/// Trim and lowercase `email` and check that it is a valid address.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if `email` is not a valid email address.
pub fn normalize_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();

    EmailAddress::from_str(&email)
        .map(|_| email.clone())
        .map_err(|_| Error::InvalidEmail(email))
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            email_verified INTEGER NOT NULL DEFAULT 0,
            track_banks INTEGER NOT NULL DEFAULT 0
        );",
    )
}

/// Create a user and seed their default categories.
///
/// # Errors
///
/// - [Error::InvalidEmail] if `email` is not a valid address.
/// - [Error::DuplicateEmail] if another user already has `email`.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let email = normalize_email(email)?;
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (&email, password_hash.as_ref()),
    )?;
    let id = UserID::new(transaction.last_insert_rowid());

    seed_default_categories(id, &transaction)?;
    transaction.commit()?;

    Ok(User {
        id,
        email,
        password_hash,
        email_verified: false,
        track_banks: false,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, email_verified, track_banks FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`, compared case-insensitively.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has that email.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, password, email_verified, track_banks FROM user \
            WHERE email = :email",
        )?
        .query_row(&[(":email", &email.trim().to_lowercase())], map_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Turn bank tracking on or off for a user.
pub fn set_bank_tracking(
    user_id: UserID,
    enabled: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET track_banks = ?1 WHERE id = ?2",
        (enabled, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::MissingUser);
    }

    Ok(())
}

/// Replace a user's password hash.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::MissingUser);
    }

    Ok(())
}

/// Delete a user along with their categories, banks and expenses.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM user WHERE id = ?1", [user_id.as_i64()])?;

    if rows_affected == 0 {
        return Err(Error::MissingUser);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(2)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        email_verified: row.get(3)?,
        track_banks: row.get(4)?,
    })
}

#[cfg(test)]
mod user_tests {
    use crate::{
        Error,
        auth::PasswordHash,
        category::get_categories,
        test_utils::{get_test_connection, insert_test_user},
    };

    use super::{
        UserID, count_users, create_user, delete_user, get_user_by_email, get_user_by_id,
        set_bank_tracking, update_password,
    };

    #[test]
    fn insert_user_succeeds() {
        let connection = get_test_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let user = create_user("Foo@Example.com ", password_hash.clone(), &connection).unwrap();

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.email, "foo@example.com");
        assert_eq!(user.password_hash, password_hash);
        assert!(!user.email_verified);
        assert!(!user.track_banks);
    }

    #[test]
    fn insert_user_seeds_default_categories() {
        let connection = get_test_connection();

        let user = insert_test_user("foo@example.com", &connection);

        let names = get_categories(user.id, &connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "Bills",
                "Entertainment",
                "Food",
                "Health",
                "Income",
                "Other",
                "Shopping",
                "Transport"
            ]
        );
    }

    #[test]
    fn insert_user_fails_on_invalid_email() {
        let connection = get_test_connection();

        let result = create_user("not an email", PasswordHash::new_unchecked("x"), &connection);

        assert_eq!(result, Err(Error::InvalidEmail("not an email".to_owned())));
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let connection = get_test_connection();
        insert_test_user("foo@example.com", &connection);

        let result = create_user(
            "FOO@example.com",
            PasswordHash::new_unchecked("x"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(count_users(&connection), Ok(1));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let connection = get_test_connection();

        assert_eq!(
            get_user_by_id(UserID::new(42), &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_user_by_email_ignores_case() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);

        let got = get_user_by_email(" Foo@Example.COM", &connection);

        assert_eq!(got, Ok(user));
    }

    #[test]
    fn bank_tracking_can_be_toggled() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);

        set_bank_tracking(user.id, true, &connection).unwrap();
        assert!(get_user_by_id(user.id, &connection).unwrap().track_banks);

        set_bank_tracking(user.id, false, &connection).unwrap();
        assert!(!get_user_by_id(user.id, &connection).unwrap().track_banks);
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);
        let new_hash = PasswordHash::new_unchecked("new-hash");

        update_password(user.id, &new_hash, &connection).unwrap();

        assert_eq!(
            get_user_by_id(user.id, &connection).unwrap().password_hash,
            new_hash
        );
    }

    #[test]
    fn update_missing_user_fails() {
        let connection = get_test_connection();

        assert_eq!(
            set_bank_tracking(UserID::new(9), true, &connection),
            Err(Error::MissingUser)
        );
    }

    #[test]
    fn delete_user_cascades_to_categories() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);

        delete_user(user.id, &connection).unwrap();

        assert_eq!(count_users(&connection), Ok(0));
        let category_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(category_count, 0);
        assert_eq!(delete_user(user.id, &connection), Err(Error::MissingUser));
    }
}
