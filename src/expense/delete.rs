use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    alert::Alert,
    auth::UserID,
    expense::{ExpenseId, delete_expense, state::ExpenseEndpointState},
};

/// Delete one of the user's expenses. Returns a success alert or an error alert.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(user_id, expense_id, &connection) {
        Ok(()) => {
            state.expense_feed.publish(user_id, &*connection);

            Alert::SuccessSimple {
                message: "Expense deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(Error::DeleteMissingExpense) => Error::DeleteMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
