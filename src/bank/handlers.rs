//! Endpoints for adding and removing banks from the profile page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{UserID, get_user_by_id},
    bank::{BankFormData, BankId, BankName, create_bank, delete_bank},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    store::ExpenseFeed,
};

/// The state needed for creating and deleting banks.
#[derive(Debug, Clone)]
pub struct BankEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub expense_feed: ExpenseFeed,
}

impl FromRef<AppState> for BankEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            expense_feed: state.expense_feed.clone(),
        }
    }
}

/// The inline form on the profile page for adding a bank.
pub fn new_bank_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::BANKS_API)
            hx-target-error="#alert-container"
            class="flex items-end gap-2 w-full"
        {
            div class="flex-1"
            {
                label for="bank-name" class=(FORM_LABEL_STYLE) { "New bank" }

                input
                    id="bank-name"
                    type="text"
                    name="name"
                    placeholder="e.g. HDFC Savings"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="w-24"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}

/// Add a bank for the user. Only allowed while bank tracking is on.
pub async fn create_bank_endpoint(
    State(state): State<BankEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BankFormData>,
) -> Response {
    let name = match BankName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = get_user_by_id(user_id, &connection).and_then(|user| {
        if !user.track_banks {
            return Err(Error::BankTrackingDisabled);
        }

        create_bank(user_id, name, &connection)
    });

    match result {
        Ok(_) => (
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::NotFound) => Error::MissingUser.into_alert_response(),
        Err(error @ (Error::BankTrackingDisabled | Error::DuplicateBankName(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a bank: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete one of the user's banks. Expenses assigned to it lose their bank.
pub async fn delete_bank_endpoint(
    State(state): State<BankEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(bank_id): Path<BankId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_bank(user_id, bank_id, &connection) {
        Ok(()) => {
            state.expense_feed.publish(user_id, &*connection);

            Alert::SuccessSimple {
                message: "Bank deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(Error::DeleteMissingBank) => Error::DeleteMissingBank.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting bank {bank_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod bank_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        auth::{UserID, set_bank_tracking},
        bank::{BankFormData, BankName, create_bank, get_banks},
        endpoints,
        store::ExpenseFeed,
        test_utils::{assert_hx_redirect, get_test_connection, insert_test_user},
    };

    use super::{BankEndpointState, create_bank_endpoint, delete_bank_endpoint};

    fn get_state(track_banks: bool) -> (BankEndpointState, UserID) {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);
        set_bank_tracking(user.id, track_banks, &connection).unwrap();

        (
            BankEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
                expense_feed: ExpenseFeed::new(),
            },
            user.id,
        )
    }

    fn bank_form(name: &str) -> Form<BankFormData> {
        Form(BankFormData {
            name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn creates_bank_when_tracking_is_on() {
        let (state, user_id) = get_state(true);

        let response =
            create_bank_endpoint(State(state.clone()), Extension(user_id), bank_form("HDFC"))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PROFILE_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let banks = get_banks(user_id, &connection).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].name, BankName::new_unchecked("HDFC"));
    }

    #[tokio::test]
    async fn rejects_bank_when_tracking_is_off() {
        let (state, user_id) = get_state(false);

        let response =
            create_bank_endpoint(State(state.clone()), Extension(user_id), bank_form("HDFC"))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_banks(user_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_duplicate_bank() {
        let (state, user_id) = get_state(true);
        {
            let connection = state.db_connection.lock().unwrap();
            create_bank(user_id, BankName::new_unchecked("HDFC"), &connection).unwrap();
        }

        let response =
            create_bank_endpoint(State(state), Extension(user_id), bank_form("hdfc")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deletes_bank() {
        let (state, user_id) = get_state(true);
        let bank = {
            let connection = state.db_connection.lock().unwrap();
            create_bank(user_id, BankName::new_unchecked("HDFC"), &connection).unwrap()
        };

        let response =
            delete_bank_endpoint(State(state.clone()), Extension(user_id), Path(bank.id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_banks(user_id, &connection).unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_bank_returns_not_found() {
        let (state, user_id) = get_state(true);

        let response = delete_bank_endpoint(State(state), Extension(user_id), Path(42)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
