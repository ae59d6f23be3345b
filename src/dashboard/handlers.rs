//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - The state used by the handler

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use time::{Date, UtcOffset};

use crate::{
    AppState, Budget, BudgetStatus, CategoryTotal, Error, Expense, SpendingSummary,
    aggregation::{evaluate_budgets, group_by_category, summarize_spending},
    budget::get_budgets,
    dashboard::{
        cards::{
            budget_status_view, recent_expenses_view, summary_cards_view,
            weekly_summary_card_view,
        },
        charts::{
            DashboardChart, ECHARTS_URL, budget_chart, chart_container_view, charts_script,
            spending_by_category_chart,
        },
    },
    endpoints,
    expense::get_expenses,
    html::{CARD_STYLE, HeadElement, PAGE_CONTAINER_STYLE, base, link, page_header},
    navigation::NavBar,
    report::{filter_by_date_range, month_bounds},
    timezone::{local_offset_or_error, now_local},
};

const SPENDING_CHART_ID: &str = "spending-chart";
const BUDGET_CHART_ID: &str = "budget-chart";

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading expenses and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    summary: SpendingSummary,
    category_totals: Vec<CategoryTotal>,
    budget_statuses: Vec<BudgetStatus>,
    recent_expenses: Vec<Expense>,
}

/// Display a page with an overview of the user's spending.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let (expenses, budgets) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let expenses = get_expenses(&connection)
            .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?;
        let budgets = get_budgets(&connection)
            .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;

        (expenses, budgets)
    };

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if expenses.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let today = now_local(local_offset).date();
    let data = build_dashboard_data(expenses, &budgets, today, local_offset);

    Ok(dashboard_view(nav_bar, &data, local_offset).into_response())
}

/// Aggregate `expenses`, which must be sorted newest first, for display.
///
/// Budgets are monthly, so they are only compared against the expenses in the
/// calendar month containing `today`.
fn build_dashboard_data(
    expenses: Vec<Expense>,
    budgets: &[Budget],
    today: Date,
    local_offset: UtcOffset,
) -> DashboardData {
    let (month_start, month_end) = month_bounds(today, local_offset);
    let this_month = filter_by_date_range(&expenses, month_start, month_end);

    DashboardData {
        summary: summarize_spending(&expenses),
        category_totals: group_by_category(&expenses),
        budget_statuses: evaluate_budgets(&this_month, budgets),
        recent_expenses: expenses,
    }
}

/// Creates the dashboard charts from the aggregated data.
///
/// The budget chart is left out when there are no budgets.
fn build_dashboard_charts(data: &DashboardData) -> Vec<DashboardChart> {
    let mut charts = vec![DashboardChart {
        id: SPENDING_CHART_ID,
        options: spending_by_category_chart(&data.category_totals).to_string(),
    }];

    if !data.budget_statuses.is_empty() {
        charts.push(DashboardChart {
            id: BUDGET_CHART_ID,
            options: budget_chart(&data.budget_statuses).to_string(),
        });
    }

    charts
}

/// Renders the dashboard page when no expenses exist.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_expense_link = link(endpoints::EXPENSES_VIEW, "add your first expense");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you record some spending. \
                Go ahead and " (new_expense_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with summary cards, charts, budgets and recent expenses.
fn dashboard_view(nav_bar: NavBar<'_>, data: &DashboardData, local_offset: UtcOffset) -> Markup {
    let nav_bar = nav_bar.into_html();
    let charts = build_dashboard_charts(data);

    let content = html!(
        (nav_bar)

        main id="dashboard-content" class=(PAGE_CONTAINER_STYLE)
        {
            (page_header("Dashboard", Some("A snapshot of your spending.")))

            div class="w-full space-y-6"
            {
                (summary_cards_view(&data.summary))

                div class="grid grid-cols-1 gap-6 lg:grid-cols-3"
                {
                    div class={(CARD_STYLE) " lg:col-span-2"}
                    {
                        @for chart in &charts {
                            (chart_container_view(chart))
                        }
                    }

                    (budget_status_view(&data.budget_statuses))
                }

                div class="grid grid-cols-1 gap-6 lg:grid-cols-3"
                {
                    div class="lg:col-span-2"
                    {
                        (recent_expenses_view(&data.recent_expenses, local_offset))
                    }

                    (weekly_summary_card_view())
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
