//! Sets up the SQLite schema for users, categories, banks and expenses.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    auth::create_user_table, bank::create_bank_table, category::create_category_table,
    expense::create_expense_table,
};

/// Create all of the application's tables if they do not already exist.
///
/// Foreign keys are switched on for `connection` so that deleting a user
/// cascades to their categories, banks and expenses.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_bank_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()
}

/// Whether `error` came from a UNIQUE constraint failing.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    // Code 2067 occurs when a UNIQUE constraint failed.
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 2067
    )
}
