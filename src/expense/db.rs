//! Database operations for expenses.

use rusqlite::{Connection, Row};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    auth::UserID,
    expense::{ExpenseId, ExpenseRecord, NewExpense, UNKNOWN_LABEL},
};

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            amount REAL NOT NULL CHECK (amount >= 0),
            category_id INTEGER REFERENCES category(id) ON DELETE SET NULL,
            bank_id INTEGER REFERENCES bank(id) ON DELETE SET NULL,
            note TEXT NOT NULL DEFAULT '',
            created_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_created_at ON expense(user_id, created_at);",
    )
}

fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, Error> {
    timestamp
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), timestamp.to_string()))
}

/// Insert an expense for `user_id` and return its ID.
///
/// The caller is responsible for checking that the category and bank belong to the user.
pub fn create_expense(
    user_id: UserID,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<ExpenseId, Error> {
    connection.execute(
        "INSERT INTO expense (user_id, amount, category_id, bank_id, note, created_at) \
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            expense.amount,
            expense.category_id,
            expense.bank_id,
            &expense.note,
            format_timestamp(expense.created_at)?,
        ),
    )?;

    Ok(connection.last_insert_rowid())
}

const SELECT_RECORDS: &str = "SELECT expense.id, expense.amount, category.name, \
    expense.category_id, bank.name, expense.bank_id, expense.note, expense.created_at \
    FROM expense \
    LEFT JOIN category ON category.id = expense.category_id \
    LEFT JOIN bank ON bank.id = expense.bank_id";

/// Retrieve one of the user's expenses.
pub fn get_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<ExpenseRecord, Error> {
    connection
        .prepare(&format!(
            "{SELECT_RECORDS} WHERE expense.id = ?1 AND expense.user_id = ?2"
        ))?
        .query_row((expense_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the user's expenses, newest first.
pub fn get_expense_records(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<ExpenseRecord>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_RECORDS} WHERE expense.user_id = ?1 \
            ORDER BY expense.created_at DESC, expense.id DESC"
        ))?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_record| maybe_record.map_err(|error| error.into()))
        .collect()
}

/// Overwrite one of the user's expenses.
///
/// # Errors
///
/// Returns [Error::UpdateMissingExpense] if the user has no such expense.
pub fn update_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE expense SET amount = ?1, category_id = ?2, bank_id = ?3, note = ?4, \
        created_at = ?5 WHERE id = ?6 AND user_id = ?7",
        (
            expense.amount,
            expense.category_id,
            expense.bank_id,
            &expense.note,
            format_timestamp(expense.created_at)?,
            expense_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete one of the user's expenses.
///
/// # Errors
///
/// Returns [Error::DeleteMissingExpense] if the user has no such expense.
pub fn delete_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<ExpenseRecord, rusqlite::Error> {
    let category: Option<String> = row.get(2)?;
    let raw_created_at: Option<String> = row.get(7)?;
    let created_at = raw_created_at.and_then(|raw| match OffsetDateTime::parse(&raw, &Rfc3339) {
        Ok(created_at) => Some(created_at),
        Err(error) => {
            tracing::warn!("Ignoring unparseable expense timestamp {raw:?}: {error}");
            None
        }
    });

    Ok(ExpenseRecord {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: category.unwrap_or_else(|| UNKNOWN_LABEL.to_owned()),
        category_id: row.get(3)?,
        bank: row.get(4)?,
        bank_id: row.get(5)?,
        note: row.get(6)?,
        created_at,
    })
}
