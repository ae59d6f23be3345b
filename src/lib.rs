//! Pennywise is a web app for tracking personal expenses.
//!
//! Expenses are logged against a fixed set of categories, summarised on a
//! dashboard, compared against monthly per-category budgets and filtered into
//! date-range reports. An optional AI assistant can suggest categories, turn a
//! sentence into a prefilled expense and write a short weekly summary.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod alert;
mod app_state;
mod assistant;
mod budget;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod error_pages;
mod expense;
mod html;
mod logging;
mod navigation;
mod report;
mod routing;
mod settings;
mod timezone;
mod validation;

#[cfg(test)]
mod test_utils;

pub use aggregation::{
    BudgetStatus, CategoryTotal, SpendingSummary, evaluate_budgets, group_by_category,
    summarize_spending,
};
pub use app_state::AppState;
pub use assistant::{
    AssistantError, AssistantFuture, DisabledAssistant, ExpenseAssistant, HttpAssistant,
    ParsedExpense,
};
pub use budget::{Budget, get_budgets, set_budgets};
pub use category::{Category, UnknownCategory};
pub use database_id::ExpenseId;
pub use db::{clear_all_data, initialize as initialize_db};
pub use error::Error;
pub use expense::{Expense, ExpenseInput, create_expense, get_expense, get_expenses};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use report::{day_bounds, filter_by_date_range, period_total};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use validation::{FieldError, ValidationErrors};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
