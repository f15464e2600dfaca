//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped into the page's alert container out-of-band, so they
//! work both as the main response to an HTMX request and alongside another
//! fragment.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// An alert message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with some extra details.
    Success { message: String, details: String },
    /// A success message with no details.
    SuccessSimple { message: String },
    /// An error message with details on how to fix the problem.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
        };

        let container_style = if is_error {
            "flex items-start gap-3 p-4 mb-4 rounded-lg shadow-lg border \
            text-red-800 bg-red-50 border-red-300 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start gap-3 p-4 mb-4 rounded-lg shadow-lg border \
            text-green-800 bg-green-50 border-green-300 \
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="ms-auto text-lg leading-none"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn simple_success_alert_has_no_details() {
        let response = Alert::SuccessSimple {
            message: "Deleted".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let paragraphs = html
            .select(&Selector::parse("p").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(paragraphs.len(), 1, "want 1 paragraph, got {}", paragraphs.len());
    }

    #[tokio::test]
    async fn error_alert_is_swapped_out_of_band() {
        let response = Alert::Error {
            message: "Oops".to_owned(),
            details: "Try again".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        let container = html
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("No alert container found");

        assert_eq!(container.value().attr("hx-swap-oob"), Some("true"));
        let text = container.text().collect::<String>();
        assert!(text.contains("Oops") && text.contains("Try again"));
    }
}
