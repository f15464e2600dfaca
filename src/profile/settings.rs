//! Endpoints for the account settings on the profile page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{UserID, delete_user, invalidate_auth_cookie, set_bank_tracking},
    endpoints,
    store::ExpenseFeed,
};

/// The state needed for changing or deleting the user's profile.
#[derive(Clone)]
pub struct ProfileEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub expense_feed: ExpenseFeed,
    pub cookie_key: Key,
}

impl FromRef<AppState> for ProfileEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            expense_feed: state.expense_feed.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

impl FromRef<ProfileEndpointState> for Key {
    fn from_ref(state: &ProfileEndpointState) -> Self {
        state.cookie_key.clone()
    }
}

/// The bank tracking toggle. Unchecked checkboxes are left out of the form.
#[derive(Debug, Default, Deserialize)]
pub struct BankTrackingForm {
    pub enabled: Option<String>,
}

/// Turn bank tracking on or off and reload the profile page.
///
/// Turning it off keeps the user's banks and the banks recorded on expenses.
pub async fn set_bank_tracking_endpoint(
    State(state): State<ProfileEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BankTrackingForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let enabled = form.enabled.is_some();

    match set_bank_tracking(user_id, enabled, &connection) {
        Ok(()) => {
            tracing::info!("User {user_id} set bank tracking to {enabled}");
            state.expense_feed.publish(user_id, &*connection);

            (
                HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not update bank tracking for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete the user along with their expenses, categories and banks, then log them out.
pub async fn delete_profile_endpoint(
    State(state): State<ProfileEndpointState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_user(user_id, &connection) {
        Ok(()) => {
            tracing::info!("Deleted user {user_id}");
            state.expense_feed.publish(user_id, &*connection);

            (
                invalidate_auth_cookie(jar),
                HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
