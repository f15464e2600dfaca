//! Database operations for banks.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    bank::{Bank, BankId, BankName},
    db::is_unique_violation,
};

/// Initialize the bank table.
pub fn create_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS bank (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            UNIQUE(user_id, name COLLATE NOCASE)
        );",
    )
}

/// Create a bank for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateBankName] if the user already has a bank with the
/// same name, ignoring case.
pub fn create_bank(user_id: UserID, name: BankName, connection: &Connection) -> Result<Bank, Error> {
    match connection.execute(
        "INSERT INTO bank (user_id, name) VALUES (?1, ?2);",
        (user_id.as_i64(), name.as_ref()),
    ) {
        Ok(_) => {}
        Err(error) if is_unique_violation(&error) => {
            return Err(Error::DuplicateBankName(name.to_string()));
        }
        Err(error) => return Err(error.into()),
    }

    Ok(Bank {
        id: connection.last_insert_rowid(),
        name,
    })
}

/// Retrieve a single bank owned by `user_id`.
pub fn get_bank(user_id: UserID, bank_id: BankId, connection: &Connection) -> Result<Bank, Error> {
    connection
        .prepare("SELECT id, name FROM bank WHERE id = ?1 AND user_id = ?2;")?
        .query_row((bank_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of the user's banks ordered alphabetically by name.
pub fn get_banks(user_id: UserID, connection: &Connection) -> Result<Vec<Bank>, Error> {
    connection
        .prepare("SELECT id, name FROM bank WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC;")?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_bank| maybe_bank.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's banks. Expenses assigned to it are kept.
///
/// # Errors
///
/// Returns [Error::DeleteMissingBank] if the user has no such bank.
pub fn delete_bank(user_id: UserID, bank_id: BankId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM bank WHERE id = ?1 AND user_id = ?2",
        (bank_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBank);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Bank, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;

    Ok(Bank {
        id,
        name: BankName::new_unchecked(&raw_name),
    })
}
