//! The page for setting the monthly budget of each category.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Category, Error,
    budget::{Budget, get_budgets},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_currency, loading_spinner,
        page_header,
    },
    navigation::NavBar,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    /// The database connection for reading budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the budget form prefilled with the current budgets.
pub async fn get_budgets_page(State(state): State<BudgetsPageState>) -> Result<Response, Error> {
    let budgets = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_budgets(&connection)
            .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?
    };

    Ok(budgets_view(&budgets).into_response())
}

fn budgets_view(budgets: &[Budget]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let monthly_total: f64 = budgets.iter().map(|budget| budget.amount).sum();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (page_header(
                "Budgets",
                Some("Set how much you want to spend on each category per month. \
                    Leave a category blank to not track it.")
            ))

            form
                hx-post=(endpoints::BUDGETS_API)
                hx-target-error="#alert-container"
                class={(CARD_STYLE) " max-w-md space-y-4"}
            {
                @for category in Category::ALL {
                    (budget_input_view(category, find_budget(budgets, category)))
                }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Total monthly budget: " (format_currency(monthly_total))
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" { (loading_spinner()) }
                    " Save Budgets"
                }
            }
        }
    };

    base("Budgets", &[dollar_input_styles()], &content)
}

fn find_budget(budgets: &[Budget], category: Category) -> Option<f64> {
    budgets
        .iter()
        .find(|budget| budget.category == category)
        .map(|budget| budget.amount)
}

fn budget_input_view(category: Category, amount: Option<f64>) -> Markup {
    let name = category.as_str();

    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (name) }

            div class="input-wrapper w-full"
            {
                input
                    name=(name)
                    id=(name)
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="No budget"
                    value=[amount.map(|amount| format!("{amount:.2}"))]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}
