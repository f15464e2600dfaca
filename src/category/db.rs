//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryName, DEFAULT_CATEGORIES},
    db::is_unique_violation,
};

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            UNIQUE(user_id, name COLLATE NOCASE)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )
}

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// with the same name, ignoring case.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    match connection.execute(
        "INSERT INTO category (user_id, name) VALUES (?1, ?2);",
        (user_id.as_i64(), name.as_ref()),
    ) {
        Ok(_) => {}
        Err(error) if is_unique_violation(&error) => {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }
        Err(error) => return Err(error.into()),
    }

    let id = connection.last_insert_rowid();

    Ok(Category { id, name })
}

/// Retrieve a single category owned by `user_id`.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE id = :id AND user_id = :user_id;")?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Find the user's category called `name`, ignoring case, creating it if it
/// does not exist yet.
pub fn get_or_create_category_by_name(
    user_id: UserID,
    name: CategoryName,
    connection: &Connection,
) -> Result<Category, Error> {
    let existing = connection
        .prepare(
            "SELECT id, name FROM category WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE;",
        )?
        .query_row((user_id.as_i64(), name.as_ref()), map_row);

    match existing {
        Ok(category) => Ok(category),
        Err(rusqlite::Error::QueryReturnedNoRows) => create_category(user_id, name, connection),
        Err(error) => Err(error.into()),
    }
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name FROM category WHERE user_id = :user_id \
            ORDER BY name COLLATE NOCASE ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// The categories a user may delete: everything except income.
pub fn get_manageable_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    get_categories(user_id, connection).map(|categories| {
        categories
            .into_iter()
            .filter(|category| !category.name.is_income())
            .collect()
    })
}

/// Delete one of the user's categories.
///
/// Expenses in the category are kept and read as "Unknown" afterwards.
///
/// # Errors
///
/// - [Error::ProtectedCategory] for the income category.
/// - [Error::DeleteMissingCategory] if the user has no such category.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    match get_category(user_id, category_id, connection) {
        Ok(category) if category.name.is_income() => {
            return Err(Error::ProtectedCategory(category.name.to_string()));
        }
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Give a new account the default set of categories.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let mut statement =
        connection.prepare("INSERT OR IGNORE INTO category (user_id, name) VALUES (?1, ?2);")?;

    for name in DEFAULT_CATEGORIES {
        statement.execute((user_id.as_i64(), name))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category { id, name })
}
