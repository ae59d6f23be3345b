//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{get_budgets_page, update_budgets_endpoint},
    dashboard::{get_dashboard_page, weekly_summary_endpoint},
    endpoints,
    error_pages::{get_404_not_found, get_internal_server_error_page},
    expense::{
        create_expense_endpoint, get_expenses_page, parse_expense_endpoint,
        suggest_category_endpoint,
    },
    report::get_reports_page,
    settings::{clear_data_endpoint, get_settings_page},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
        .route(endpoints::SUGGEST_CATEGORY, post(suggest_category_endpoint))
        .route(endpoints::PARSE_EXPENSE, post(parse_expense_endpoint))
        .route(endpoints::BUDGETS_API, post(update_budgets_endpoint))
        .route(endpoints::WEEKLY_SUMMARY, post(weekly_summary_endpoint))
        .route(endpoints::CLEAR_DATA, post(clear_data_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
