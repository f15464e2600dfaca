//! Route guards that require a signed-in user.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// What the guards need from [AppState].
#[derive(Clone)]
pub struct AuthState {
    /// Encrypts the session cookie.
    pub cookie_key: Key,
    /// How long a session lasts without activity.
    pub cookie_duration: Duration,
    /// Canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a guard turns away a request without a session.
#[derive(Clone, Copy)]
enum Rejection {
    /// A plain 303 redirect, for full page loads.
    Redirect,
    /// An `HX-Redirect` header, since HTMX would otherwise swap the log-in page into the target.
    HxRedirect,
}

impl Rejection {
    fn to_log_in(self, request: &Request) -> Response {
        let url = build_log_in_redirect_url(request).unwrap_or_else(|| {
            tracing::warn!("Could not build a redirect URL from the request, using home instead.");

            build_log_in_redirect_url_from_target(endpoints::HOME_VIEW)
                .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
        });

        match self {
            Rejection::Redirect => Redirect::to(&url).into_response(),
            Rejection::HxRedirect => (HxRedirect(url), StatusCode::OK).into_response(),
        }
    }
}

/// Append the refreshed session cookie to `response`, unless the handler set cookies itself
/// (e.g. by signing the user out).
fn with_refreshed_session(
    response: Response,
    jar: PrivateCookieJar,
    cookie_duration: Duration,
    local_offset: UtcOffset,
) -> Response {
    if response.headers().contains_key(SET_COOKIE) {
        return response;
    }

    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), cookie_duration, local_offset)
        .unwrap_or_else(|error| {
            tracing::error!("Could not extend the session: {error:?}");
            jar
        });

    let (mut parts, body) = response.into_parts();
    for value in jar.into_response().headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

async fn guard(state: AuthState, request: Request, next: Next, rejection: Rejection) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone \"{}\"", state.local_timezone);
        return rejection.to_log_in(&request);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read the cookie jar: {error:?}");
            return rejection.to_log_in(&Request::from_parts(parts, body));
        }
    };

    let Ok(token) = get_token_from_cookies(&jar) else {
        return rejection.to_log_in(&Request::from_parts(parts, body));
    };

    parts.extensions.insert(token.user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    with_refreshed_session(response, jar, state.cookie_duration, local_offset)
}

/// Guard for pages. Adds the signed-in [UserID](crate::auth::UserID) as a request extension,
/// or redirects to the log-in page.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, Rejection::Redirect).await
}

/// Guard for HTMX endpoints. Same as [auth_guard] but redirects with `HX-Redirect`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, Rejection::HxRedirect).await
}
