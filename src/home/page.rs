use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{month_category_totals, monthly_summary},
    auth::{UserID, get_user_by_id},
    endpoints,
    expense::{expense_table, get_expense_records},
    home::cards::{category_breakdown, summary_cards},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_now,
};

/// The state needed for the home page.
#[derive(Debug, Clone)]
pub struct HomePageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for HomePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders this month's summary and entries, newest first.
pub async fn get_home_page(
    State(state): State<HomePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_now(&state.local_timezone)?.date();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let user = get_user_by_id(user_id, &connection)?;
    let records = get_expense_records(user_id, &connection)?;
    drop(connection);

    let this_month = records
        .iter()
        .filter(|record| {
            record
                .date()
                .is_some_and(|date| date.year() == today.year() && date.month() == today.month())
        })
        .collect::<Vec<_>>();
    let summary = monthly_summary(this_month.iter().copied(), today);
    let category_totals = month_category_totals(this_month.iter().copied(), today);

    let nav_bar = NavBar::new(endpoints::HOME_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { (today.month()) " " (today.year()) }
                        p class="text-sm text-gray-600 dark:text-gray-400" { (user.email) }
                    }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                }

                (summary_cards(&summary))

                (category_breakdown(&category_totals))

                h2 class="text-lg font-semibold" { "This month" }

                (expense_table(&this_month, user.track_banks, endpoints::HOME_VIEW))
            }
        }
    };

    Ok(base("Home", &[], &content).into_response())
}
