//! Full-page responses for missing pages and server failures.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// The 404 page.
pub struct NotFoundPage;

impl IntoResponse for NotFoundPage {
    fn into_response(self) -> Response {
        let page = error_view(
            "Not Found",
            "404",
            "Nothing to see here.",
            "That page does not exist. Head back to the dashboard to keep tracking your spending.",
        );

        (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
    }
}

/// The 500 page with a customisable explanation.
pub struct ServerErrorPage<'a> {
    /// What went wrong.
    pub description: &'a str,
    /// What the user or operator can do about it.
    pub fix: &'a str,
}

impl Default for ServerErrorPage<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for ServerErrorPage<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

/// Router fallback for unknown routes.
pub async fn get_404_not_found() -> Response {
    NotFoundPage.into_response()
}

/// Route handler for the generic error page.
pub async fn get_internal_server_error_page() -> Response {
    ServerErrorPage::default().into_response()
}
