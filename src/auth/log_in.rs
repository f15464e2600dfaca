//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, current_user, get_user_by_email, invalidate_auth_cookie,
        normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, auth_card, base, email_input, loading_spinner, password_input},
    timezone::get_local_offset,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "

                a
                    href=(endpoints::FORGOT_PASSWORD_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Reset it here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page, or skip it if the user is already signed in.
pub async fn get_log_in_page(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, Error> {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");

    let signed_in_user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;
        current_user(&jar, &connection)?
    };

    if signed_in_user.is_some() {
        let target = redirect_url.as_deref().unwrap_or(endpoints::HOME_VIEW);
        return Ok(Redirect::to(target).into_response());
    }

    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = auth_card("Log in to your account", &log_in_form);

    Ok(base("Log In", &[], &content).into_response())
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    pub email: String,

    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// Checkboxes are only sent when checked, so `Some` means true
    /// regardless of the string value.
    pub remember_me: Option<String>,

    /// Where to send the user after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the home page or the page they originally asked for.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let render_error = |message: &str| {
        log_in_form(&user_data.email, Some(message), redirect_url).into_response()
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return render_error(INTERNAL_ERROR_MSG);
            }
        };

        match get_user_by_email(&user_data.email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return render_error(INTERNAL_ERROR_MSG);
            }
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => return render_error(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(INTERNAL_ERROR_MSG);
        }
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::HOME_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        auth::{COOKIE_TOKEN, PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
        endpoints,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            get_header, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, REMEMBER_ME_COOKIE_DURATION,
        RedirectQuery, get_log_in_page, post_log_in,
    };

    const TEST_EMAIL: &str = "test@example.com";
    const TEST_PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_state(with_user: bool) -> LoginState {
        let connection = crate::test_utils::get_test_connection();

        if with_user {
            let hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
                .expect("Could not hash test password");
            create_user(TEST_EMAIL, hash, &connection).expect("Could not create test user");
        }

        LoginState::new("foobar", "Etc/UTC", Arc::new(Mutex::new(connection)))
    }

    fn log_in_data(email: &str, password: &str, remember_me: bool) -> LogInData {
        LogInData {
            email: email.to_owned(),
            password: password.to_owned(),
            remember_me: remember_me.then(|| "on".to_owned()),
            redirect_url: None,
        }
    }

    async fn new_log_in_request(state: LoginState, data: LogInData) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        post_log_in(State(state), jar, Form(data)).await
    }

    #[track_caller]
    fn assert_password_error(html: &scraper::Html, want: &str) {
        let selector = scraper::Selector::parse("input#password + p.text-red-500").unwrap();
        let message = html
            .select(&selector)
            .next()
            .expect("No password error message found")
            .text()
            .collect::<String>();

        assert_eq!(message.trim(), want);
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let state = get_test_state(false);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_log_in_page(
            State(state),
            jar,
            Query(RedirectQuery { redirect_url: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");

        let links = form
            .select(&scraper::Selector::parse("a[href]").unwrap())
            .map(|link| link.value().attr("href").unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(
            links,
            [endpoints::FORGOT_PASSWORD_VIEW, endpoints::REGISTER_VIEW]
        );
    }

    #[tokio::test]
    async fn log_in_page_preserves_redirect_url() {
        let state = get_test_state(false);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());
        let redirect_url = "/expenses?category=Food".to_owned();

        let response = get_log_in_page(
            State(state),
            jar,
            Query(RedirectQuery {
                redirect_url: Some(redirect_url.clone()),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let input = document
            .select(&scraper::Selector::parse("input[name=redirect_url]").unwrap())
            .next()
            .expect("No redirect_url input");
        assert_eq!(input.value().attr("value"), Some(redirect_url.as_str()));
    }

    #[tokio::test]
    async fn log_in_page_redirects_signed_in_user() {
        let state = get_test_state(true);
        let jar = set_auth_cookie(
            PrivateCookieJar::new(state.cookie_key.clone()),
            crate::auth::UserID::new(1),
            Duration::minutes(5),
            UtcOffset::UTC,
        )
        .unwrap();

        let response = get_log_in_page(
            State(state),
            jar,
            Query(RedirectQuery { redirect_url: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "location"), endpoints::HOME_VIEW);
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state(true);

        let response =
            new_log_in_request(state, log_in_data("Test@Example.com", TEST_PASSWORD, false)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::HOME_VIEW);
        let set_cookie = get_header(&response, "set-cookie");
        let cookie = Cookie::parse(set_cookie).unwrap();
        assert_eq!(cookie.name(), COOKIE_TOKEN);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_page() {
        let state = get_test_state(true);
        let mut data = log_in_data(TEST_EMAIL, TEST_PASSWORD, false);
        data.redirect_url = Some("/charts?year=2024".to_owned());

        let response = new_log_in_request(state, data).await;

        assert_hx_redirect(&response, "/charts?year=2024");
    }

    #[tokio::test]
    async fn remember_me_extends_cookie() {
        let state = get_test_state(true);

        let response =
            new_log_in_request(state, log_in_data(TEST_EMAIL, TEST_PASSWORD, true)).await;

        let cookie = Cookie::parse(get_header(&response, "set-cookie")).unwrap();
        let expires = cookie.expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION;
        assert!((expires - want).abs() < Duration::seconds(2));
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state(true);

        let response =
            new_log_in_request(state, log_in_data(TEST_EMAIL, "wrongpassword", false)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_password_error(&html, INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let state = get_test_state(true);

        let response = new_log_in_request(
            state,
            log_in_data("nobody@example.com", TEST_PASSWORD, false),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_password_error(&html, INVALID_CREDENTIALS_ERROR_MSG);
    }
}
