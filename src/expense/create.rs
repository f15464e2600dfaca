//! The new expense page and the endpoint that saves it.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    auth::{UserID, get_user_by_id},
    bank::{Bank, get_banks},
    category::{Category, get_categories},
    endpoints,
    expense::{
        create_expense,
        form::{ExpenseForm, ExpenseFormDefaults, expense_form_fields, resolve_expense},
        state::{ExpenseEndpointState, ExpensePageState},
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner, rupee_input_styles},
    navigation::NavBar,
    timezone::local_now,
};

fn new_expense_view(
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[Category],
    banks: Option<&[Bank]>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let fields = expense_form_fields(defaults, categories, banks);
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::EXPENSES_API)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Expense" }

                (fields)

                button id="submit-button" type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Save Expense"
                }
            }
        }
    };

    base("New Expense", &[rupee_input_styles()], &content)
}

/// Renders the page for recording a new expense. The date defaults to today.
pub async fn get_new_expense_page(
    State(state): State<ExpensePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let banks = if user.track_banks {
        Some(get_banks(user_id, &connection)?)
    } else {
        None
    };

    let defaults = ExpenseFormDefaults {
        amount: None,
        category: None,
        note: None,
        date: today,
        max_date: today,
        bank_id: None,
    };

    Ok(new_expense_view(&defaults, &categories, banks.as_deref()).into_response())
}

/// Saves a new expense and redirects to the expenses page.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let now = match local_now(&state.local_timezone) {
        Ok(now) => now,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = connection
        .unchecked_transaction()
        .map_err(Error::from)
        .and_then(|transaction| {
            let expense = resolve_expense(user_id, &form, now, now.date(), &transaction)?;
            let expense_id = create_expense(user_id, &expense, &transaction)?;
            transaction.commit()?;

            Ok(expense_id)
        });

    match result {
        Ok(expense_id) => {
            tracing::debug!("Created expense {expense_id} for user {user_id}");
            state.expense_feed.publish(user_id, &*connection);

            (
                HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create expense: {error}");
            error.into_alert_response()
        }
    }
}
