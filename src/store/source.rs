use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    expense::{ExpenseRecord, get_expense_records},
};

/// Somewhere a user's full set of expense records can be read from.
pub trait RecordSource {
    /// Read every record belonging to `user_id`, newest first.
    fn snapshot(&self, user_id: UserID) -> Result<Vec<ExpenseRecord>, Error>;
}

impl RecordSource for Connection {
    fn snapshot(&self, user_id: UserID) -> Result<Vec<ExpenseRecord>, Error> {
        get_expense_records(user_id, self)
    }
}
