//! The API endpoints URIs.
//!
//! Routes ending in `_VIEW` serve full pages, the rest are called by htmx and
//! return fragments or redirects.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with the spending overview.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing and adding expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for setting the monthly budget of each category.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for reporting on spending over a date range.
pub const REPORTS_VIEW: &str = "/reports";
/// The page for managing the stored data.
pub const SETTINGS_VIEW: &str = "/settings";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to ask the assistant for the category of an expense.
pub const SUGGEST_CATEGORY: &str = "/api/expenses/suggest_category";
/// The route to ask the assistant to fill in the expense form from a sentence.
pub const PARSE_EXPENSE: &str = "/api/expenses/parse";
/// The route to replace the budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to ask the assistant for a summary of the last week.
pub const WEEKLY_SUMMARY: &str = "/api/dashboard/weekly_summary";
/// The route to delete all expenses and budgets.
pub const CLEAR_DATA: &str = "/api/data/clear";

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REPORTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SETTINGS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::EXPENSES_API);
        assert_endpoint_is_valid_uri(endpoints::SUGGEST_CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::PARSE_EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS_API);
        assert_endpoint_is_valid_uri(endpoints::WEEKLY_SUMMARY);
        assert_endpoint_is_valid_uri(endpoints::CLEAR_DATA);
    }
}
