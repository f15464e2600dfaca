use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{User, UserID, get_user_by_id},
    bank::{Bank, get_banks, new_bank_form},
    category::{Category, get_manageable_categories, new_category_form},
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
};

const CARD_STYLE: &str = "rounded-lg bg-white dark:bg-gray-800 shadow-md p-6 space-y-4";

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfilePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfilePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn account_section(user: &User) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold" { "Account" }

            dl class="grid grid-cols-[auto_1fr] gap-x-4 gap-y-2 text-sm"
            {
                dt class="font-medium text-gray-500 dark:text-gray-400" { "Email" }
                dd data-profile="email" { (user.email) }

                dt class="font-medium text-gray-500 dark:text-gray-400" { "Verified" }
                dd data-profile="verified"
                {
                    @if user.email_verified { "Yes" } @else { "No" }
                }
            }

            form
                hx-put=(endpoints::BANK_TRACKING)
                hx-trigger="change"
                hx-target-error="#alert-container"
                class="flex items-center gap-2"
            {
                input
                    id="bank-tracking"
                    type="checkbox"
                    name="enabled"
                    checked[user.track_banks]
                    class="w-4 h-4 rounded";

                label for="bank-tracking" class="text-sm" { "Track which bank each expense was paid from" }
            }
        }
    }
}

fn delete_button(endpoint: &str, name: &str) -> Markup {
    html! {
        button
            hx-delete=(endpoint)
            hx-confirm={ "Delete \"" (name) "\"?" }
            hx-target="closest li"
            hx-swap="delete"
            hx-target-error="#alert-container"
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

fn category_section(categories: &[Category]) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold" { "Categories" }

            ul id="category-list" class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for category in categories {
                    li class="flex justify-between items-center py-2" data-category-row="true"
                    {
                        span { (category.name) }
                        (delete_button(&format_endpoint(endpoints::CATEGORY, category.id), category.name.as_ref()))
                    }
                }

                @if categories.is_empty() {
                    li class="py-2 text-gray-500 dark:text-gray-400" { "No categories yet." }
                }
            }

            (new_category_form())
        }
    }
}

fn bank_section(banks: &[Bank]) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold" { "Banks" }

            ul id="bank-list" class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for bank in banks {
                    li class="flex justify-between items-center py-2" data-bank-row="true"
                    {
                        span { (bank.name) }
                        (delete_button(&format_endpoint(endpoints::BANK, bank.id), bank.name.as_ref()))
                    }
                }

                @if banks.is_empty() {
                    li class="py-2 text-gray-500 dark:text-gray-400" { "No banks yet." }
                }
            }

            (new_bank_form())
        }
    }
}

fn danger_section() -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            div { (link(endpoints::LOG_OUT, "Log out")) }

            button
                id="delete-profile"
                hx-delete=(endpoints::PROFILE_API)
                hx-confirm="Delete your profile? All of your expenses, categories and banks will be removed."
                hx-target-error="#alert-container"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Delete profile"
            }
        }
    }
}

/// Display the user's account details, categories and banks.
pub async fn get_profile_page(
    State(state): State<ProfilePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let categories = get_manageable_categories(user_id, &connection)?;
    let banks = if user.track_banks {
        Some(get_banks(user_id, &connection)?)
    } else {
        None
    };
    drop(connection);

    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-4 w-full max-w-xl"
            {
                h1 class="text-xl font-bold" { "Profile" }

                (account_section(&user))
                (category_section(&categories))

                @if let Some(banks) = &banks {
                    (bank_section(banks))
                }

                (danger_section())
            }
        }
    };

    Ok(base("Profile", &[], &content).into_response())
}
