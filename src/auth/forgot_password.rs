//! A page telling the user how to reset a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{LINK_STYLE, auth_card, base},
};

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    let content = html! {
        div class="space-y-4 text-gray-900 dark:text-white"
        {
            p
            {
                "Passwords are reset by whoever runs this server. Ask them to run:"
            }

            pre class="p-3 overflow-x-auto text-sm rounded bg-gray-100 dark:bg-gray-700"
            {
                code { "reset_password --db-path <DB_PATH> --email <YOUR_EMAIL>" }
            }

            p
            {
                "They will be prompted for your new password. Once it has been changed you can "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "log in" }
                " again."
            }
        }
    };

    base(
        "Forgot Password",
        &[],
        &auth_card("Reset your password", &content),
    )
    .into_response()
}
