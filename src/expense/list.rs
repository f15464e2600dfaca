//! The page listing every expense, newest first, with filters.

use axum::{
    Extension,
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};

use crate::{
    Error,
    auth::{UserID, get_user_by_id},
    bank::get_banks,
    category::get_categories,
    endpoints::{self, format_endpoint},
    expense::{
        ExpenseRecord, RecordKind, get_expense_records,
        filter::{FilterOptions, FilterQuery, filter_form},
        state::ExpensePageState,
    },
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, currency_rounded_with_tooltip,
    },
    navigation::NavBar,
};

fn amount_class(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Income => "text-green-700 dark:text-green-300",
        RecordKind::Expense => "text-red-700 dark:text-red-300",
    }
}

fn edit_url(record: &ExpenseRecord, redirect_url: &str) -> String {
    let endpoint = format_endpoint(endpoints::EDIT_EXPENSE_VIEW, record.id);

    match serde_urlencoded::to_string([("redirect_url", redirect_url)]) {
        Ok(query) => format!("{endpoint}?{query}"),
        Err(_) => endpoint,
    }
}

fn expense_row(record: &ExpenseRecord, show_bank: bool, redirect_url: &str) -> Markup {
    let date = record.date();
    let confirm_message = format!(
        "Are you sure you want to delete this {} entry? This cannot be undone.",
        record.category
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(date) = date {
                    time datetime=(date) { (date) }
                } @else {
                    span class="text-gray-400 dark:text-gray-500" { "-" }
                }
            }
            td class=(TABLE_CELL_STYLE) { span class=(CATEGORY_BADGE_STYLE) { (record.category) } }
            td class=(TABLE_CELL_STYLE) { (record.note) }
            @if show_bank {
                td class=(TABLE_CELL_STYLE) { (record.bank_label()) }
            }
            td class={ "px-6 py-4 text-right " (amount_class(record.kind())) }
            {
                (currency_rounded_with_tooltip(record.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url(record, redirect_url)) class=(LINK_STYLE) { "Edit" }

                    button
                        type="button"
                        hx-delete=(format_endpoint(endpoints::EXPENSE, record.id))
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// A table of entries with edit and delete actions.
///
/// `redirect_url` is where the edit page returns to after saving.
pub fn expense_table(records: &[&ExpenseRecord], show_bank: bool, redirect_url: &str) -> Markup {
    let column_count = if show_bank { 6 } else { 5 };

    html! {
        div class="relative overflow-x-auto shadow-md rounded w-full"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                        @if show_bank {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Bank" }
                        }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for record in records {
                        (expense_row(record, show_bank, redirect_url))
                    }

                    @if records.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td
                                colspan=(column_count)
                                class="px-6 py-4 text-center"
                                data-empty-state="true"
                            {
                                "No entries yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn totals_line(records: &[&ExpenseRecord]) -> Markup {
    let (income, expense) =
        records
            .iter()
            .fold((0.0, 0.0), |(income, expense), record| match record.kind() {
                RecordKind::Income => (income + record.amount, expense),
                RecordKind::Expense => (income, expense + record.amount),
            });

    html! {
        p class="text-sm text-gray-600 dark:text-gray-300"
        {
            (records.len()) " entries · Income "
            (currency_rounded_with_tooltip(income))
            " · Expenses "
            (currency_rounded_with_tooltip(expense))
        }
    }
}

/// Renders every entry matching the filter query, newest first.
pub async fn get_expenses_page(
    State(state): State<ExpensePageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let records = get_expense_records(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let banks = if user.track_banks {
        Some(get_banks(user_id, &connection)?)
    } else {
        None
    };
    drop(connection);

    let filter = query.record_filter();
    let filtered = filter.apply(&records);
    let redirect_url = match raw_query.as_deref() {
        Some(raw_query) if !raw_query.is_empty() => {
            format!("{}?{raw_query}", endpoints::EXPENSES_VIEW)
        }
        _ => endpoints::EXPENSES_VIEW.to_owned(),
    };

    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let filters = filter_form(
        &query,
        &FilterOptions {
            action: endpoints::EXPENSES_VIEW,
            categories: &categories,
            banks: banks.as_deref(),
            years: None,
        },
    );

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add Expense" }
                }

                (filters)

                (totals_line(&filtered))

                (expense_table(&filtered, banks.is_some(), &redirect_url))
            }
        }
    };

    Ok(base("Expenses", &[], &content).into_response())
}

#[cfg(test)]
mod expenses_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{RawQuery, State},
        response::Response,
    };
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        auth::{UserID, set_bank_tracking},
        bank::{BankName, create_bank},
        category::{CategoryName, get_or_create_category_by_name},
        endpoints::{self, format_endpoint},
        expense::{NewExpense, create_expense, filter::FilterQuery, state::ExpensePageState},
        test_utils::{
            assert_hx_endpoint, assert_status_ok, assert_valid_html, get_test_connection,
            insert_test_user, parse_html_document,
        },
    };

    use super::get_expenses_page;

    fn add(
        user_id: UserID,
        amount: f64,
        category: &str,
        note: &str,
        created_at: OffsetDateTime,
        connection: &Connection,
    ) -> i64 {
        let category = get_or_create_category_by_name(
            user_id,
            CategoryName::new_unchecked(category),
            connection,
        )
        .unwrap();
        let expense = NewExpense::new(
            amount,
            category.id,
            None,
            note,
            created_at,
            OffsetDateTime::now_utc().date(),
        )
        .unwrap();

        create_expense(user_id, &expense, connection).unwrap()
    }

    async fn render(
        state: ExpensePageState,
        user_id: UserID,
        query: FilterQuery,
        raw_query: Option<&str>,
    ) -> Response {
        get_expenses_page(
            State(state),
            Extension(user_id),
            Query(query),
            RawQuery(raw_query.map(str::to_owned)),
        )
        .await
        .unwrap()
    }

    fn rows(html: &Html) -> Vec<Vec<String>> {
        html.select(&Selector::parse("tbody tr[data-expense-row='true']").unwrap())
            .map(|row| {
                row.select(&Selector::parse("td").unwrap())
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn lists_entries_newest_first() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);
        add(user.id, 100.0, "Food", "lunch", datetime!(2024-03-05 12:00 UTC), &connection);
        let newest = add(user.id, 50.0, "Income", "refund", datetime!(2024-03-06 12:00 UTC), &connection);
        let state = ExpensePageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = render(state, user.id, FilterQuery::default(), None).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = rows(&html);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "2024-03-06");
        assert_eq!(rows[0][1], "Income");
        assert_eq!(rows[0][3], "₹50");
        assert_eq!(rows[1][2], "lunch");
        let delete_button = html
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .unwrap();
        assert_hx_endpoint(
            &delete_button,
            &format_endpoint(endpoints::EXPENSE, newest),
            "hx-delete",
        );
        assert!(delete_button.value().attr("hx-confirm").is_some());
    }

    #[tokio::test]
    async fn applies_filters() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);
        add(user.id, 100.0, "Food", "lunch", datetime!(2024-03-05 12:00 UTC), &connection);
        add(user.id, 20.0, "Transport", "bus", datetime!(2024-03-05 13:00 UTC), &connection);
        add(user.id, 30.0, "Food", "dinner", datetime!(2024-04-01 19:00 UTC), &connection);
        let state = ExpensePageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };
        let raw_query = "category=food&date_to=2024-03-31";
        let query: FilterQuery = serde_html_form::from_str(raw_query).unwrap();

        let response = render(state, user.id, query, Some(raw_query)).await;

        let html = parse_html_document(response).await;
        let rows = rows(&html);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], "lunch");
        let edit_link = html
            .select(&Selector::parse("tbody a").unwrap())
            .next()
            .unwrap();
        let href = edit_link.value().attr("href").unwrap();
        assert!(
            href.ends_with("redirect_url=%2Fexpenses%3Fcategory%3Dfood%26date_to%3D2024-03-31"),
            "got {href}"
        );
    }

    #[tokio::test]
    async fn shows_bank_column_when_tracking_banks() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);
        set_bank_tracking(user.id, true, &connection).unwrap();
        create_bank(user.id, BankName::new_unchecked("HDFC"), &connection).unwrap();
        add(user.id, 10.0, "Food", "", datetime!(2024-03-05 12:00 UTC), &connection);
        let state = ExpensePageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = render(state, user.id, FilterQuery::default(), None).await;

        let html = parse_html_document(response).await;
        let rows = rows(&html);
        assert_eq!(rows[0][3], "Unknown");
        assert!(
            html.select(&Selector::parse("select[name=bank_id]").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn empty_list_shows_placeholder() {
        let connection = get_test_connection();
        let user = insert_test_user("foo@example.com", &connection);
        let state = ExpensePageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = render(state, user.id, FilterQuery::default(), None).await;

        let html = parse_html_document(response).await;
        let placeholder = html
            .select(&Selector::parse("td[data-empty-state='true']").unwrap())
            .next()
            .expect("no empty state");
        assert_eq!(placeholder.value().attr("colspan"), Some("5"));
    }
}
