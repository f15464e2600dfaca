//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    category::{CategoryId, delete_category},
    store::ExpenseFeed,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub expense_feed: ExpenseFeed,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            expense_feed: state.expense_feed.clone(),
        }
    }
}

/// Delete one of the user's categories.
///
/// Expenses in the category are kept and read as "Unknown" afterwards, so
/// subscribers to the change feed get a fresh snapshot.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(user_id, category_id, &connection) {
        Ok(()) => {
            state.expense_feed.publish(user_id, &*connection);

            Alert::Success {
                message: "Category deleted successfully".to_owned(),
                details: "Expenses in this category are now listed as Unknown.".to_owned(),
            }
            .into_response()
        }
        Err(error @ (Error::DeleteMissingCategory | Error::ProtectedCategory(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
