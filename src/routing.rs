//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    bank::{create_bank_endpoint, delete_bank_endpoint},
    category::{create_category_endpoint, delete_category_endpoint},
    charts::{charts_stream, get_charts_page},
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        get_expenses_page, get_new_expense_page, update_expense_endpoint,
    },
    home::get_home_page,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    profile::{delete_profile_endpoint, get_profile_page, set_bank_tracking_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::HOME_VIEW, get(get_home_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_new_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::CHARTS_VIEW, get(get_charts_page))
        .route(endpoints::CHARTS_STREAM, get(charts_stream))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are called by HTMX, so auth redirects must use the HX-Redirect header.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .route(
                endpoints::EXPENSE,
                put(update_expense_endpoint).delete(delete_expense_endpoint),
            )
            .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
            .route(endpoints::CATEGORY, delete(delete_category_endpoint))
            .route(endpoints::BANKS_API, post(create_bank_endpoint))
            .route(endpoints::BANK, delete(delete_bank_endpoint))
            .route(endpoints::BANK_TRACKING, put(set_bank_tracking_endpoint))
            .route(endpoints::PROFILE_API, delete(delete_profile_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the home page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::HOME_VIEW)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        AppState,
        auth::COOKIE_TOKEN,
        endpoints::{self, format_endpoint},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "averysecretsecret",
            "Etc/UTC",
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    async fn register(server: &TestServer) -> axum_extra::extract::cookie::Cookie<'static> {
        let response = server
            .post(endpoints::USERS)
            .form(&[
                ("email", "foo@example.com"),
                ("password", "averystrongandsecurepassword"),
                ("confirm_password", "averystrongandsecurepassword"),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::HOME_VIEW);
        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn root_redirects_to_home() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::HOME_VIEW);
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let server = get_test_server();

        for page in [
            endpoints::HOME_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::NEW_EXPENSE_VIEW,
            endpoints::CHARTS_VIEW,
            endpoints::PROFILE_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status_see_other();
            let location = response.header("location");
            assert!(
                location
                    .to_str()
                    .unwrap()
                    .starts_with(endpoints::LOG_IN_VIEW),
                "{page} redirected to {location:?}"
            );
        }
    }

    #[tokio::test]
    async fn api_without_cookie_gets_hx_redirect() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES_API)
            .form(&[("amount", "1"), ("category", "Food"), ("date", "2024-01-01")])
            .await;

        response.assert_status_ok();
        assert!(
            response
                .header("hx-redirect")
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        let response = server.get("/definitely/not/a/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn registered_user_can_add_and_list_expenses() {
        let server = get_test_server();
        let cookie = register(&server).await;
        let today = time::OffsetDateTime::now_utc().date().to_string();

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(cookie.clone())
            .form(&[
                ("amount", "120.5"),
                ("category", "Snacks"),
                ("note", "samosa"),
                ("date", today.as_str()),
            ])
            .await;
        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::EXPENSES_VIEW);

        let response = server
            .get(endpoints::EXPENSES_VIEW)
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();
        let html = scraper::Html::parse_document(&response.text());
        let rows = html
            .select(&Selector::parse("tr[data-expense-row='true']").unwrap())
            .count();
        assert_eq!(rows, 1);
        assert!(response.text().contains("samosa"));

        for page in [endpoints::HOME_VIEW, endpoints::CHARTS_VIEW, endpoints::PROFILE_VIEW] {
            server
                .get(page)
                .add_cookie(cookie.clone())
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn deleting_missing_expense_is_not_found() {
        let server = get_test_server();
        let cookie = register(&server).await;

        let response = server
            .delete(&format_endpoint(endpoints::EXPENSE, 42))
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
