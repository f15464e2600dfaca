//! Editing an existing expense.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, Query};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    auth::{UserID, get_user_by_id, normalize_redirect_url},
    bank::{Bank, get_banks},
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    expense::{
        ExpenseId, ExpenseRecord, get_expense,
        form::{ExpenseForm, ExpenseFormDefaults, expense_form_fields, resolve_expense},
        state::{ExpenseEndpointState, ExpensePageState},
        update_expense,
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, LINK_STYLE, base, loading_spinner,
        rupee_input_styles,
    },
    navigation::NavBar,
    timezone::local_now,
};

/// Where to send the user after saving, e.g. back to a filtered list.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

fn update_endpoint(expense_id: ExpenseId, redirect_url: Option<&str>) -> String {
    let endpoint = format_endpoint(endpoints::EXPENSE, expense_id);

    match redirect_url.and_then(|url| serde_urlencoded::to_string([("redirect_url", url)]).ok()) {
        Some(query) => format!("{endpoint}?{query}"),
        None => endpoint,
    }
}

fn edit_expense_view(
    expense: &ExpenseRecord,
    defaults: &ExpenseFormDefaults<'_>,
    categories: &[Category],
    banks: Option<&[Bank]>,
    redirect_url: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();
    let fields = expense_form_fields(defaults, categories, banks);
    let spinner = loading_spinner();
    let redirect_url = redirect_url.and_then(normalize_redirect_url);
    let cancel_url = redirect_url.as_deref().unwrap_or(endpoints::EXPENSES_VIEW);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint(expense.id, redirect_url.as_deref()))
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Expense" }

                (fields)

                button id="submit-button" type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Save Changes"
                }

                a href=(cancel_url) class=(LINK_STYLE) { "Cancel" }
            }
        }
    };

    base("Edit Expense", &[rupee_input_styles()], &content)
}

/// Renders the form for editing one of the user's expenses, prefilled with its values.
pub async fn get_edit_expense_page(
    State(state): State<ExpensePageState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(user_id, expense_id, &connection)?;
    let user = get_user_by_id(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let banks = if user.track_banks {
        Some(get_banks(user_id, &connection)?)
    } else {
        None
    };

    // A deleted category reads as "Unknown", which should not be resubmitted as a new category.
    let category = expense.category_id.map(|_| expense.category.as_str());
    let defaults = ExpenseFormDefaults {
        amount: Some(expense.amount),
        category,
        note: Some(&expense.note),
        date: expense.date().unwrap_or(today),
        max_date: today,
        bank_id: expense.bank_id,
    };

    Ok(edit_expense_view(
        &expense,
        &defaults,
        &categories,
        banks.as_deref(),
        query.redirect_url.as_deref(),
    )
    .into_response())
}

/// Overwrites an expense with the submitted form.
///
/// The time of day the expense was first recorded at is kept.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
    Query(query): Query<RedirectQuery>,
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
            let recorded_at = match get_expense(user_id, expense_id, &transaction) {
                Ok(existing) => existing.created_at.unwrap_or(now),
                Err(Error::NotFound) => return Err(Error::UpdateMissingExpense),
                Err(error) => return Err(error),
            };
            let expense = resolve_expense(user_id, &form, recorded_at, now.date(), &transaction)?;
            update_expense(user_id, expense_id, &expense, &transaction)?;
            transaction.commit()?;

            Ok(())
        });

    match result {
        Ok(()) => {
            state.expense_feed.publish(user_id, &*connection);

            let redirect_url = query
                .redirect_url
                .as_deref()
                .and_then(normalize_redirect_url)
                .unwrap_or_else(|| endpoints::EXPENSES_VIEW.to_owned());

            (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
