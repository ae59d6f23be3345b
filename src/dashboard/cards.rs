//! Card components for the dashboard.
//!
//! Provides:
//! - Summary cards with headline spending statistics
//! - Budget progress bars for the current month
//! - The most recent expenses
//! - The weekly AI summary card

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    BudgetStatus, Expense, SpendingSummary, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, format_currency, link,
        loading_spinner,
    },
};

/// The number of expenses listed in the recent expenses card.
pub(super) const RECENT_EXPENSE_COUNT: usize = 5;

/// Shown in place of the budget progress bars when there are no budgets.
pub(super) const NO_BUDGETS_MESSAGE: &str = "No budgets set.";

/// Renders the four headline statistics.
pub(super) fn summary_cards_view(summary: &SpendingSummary) -> Markup {
    let top_category = match summary.top_category {
        Some(top) => (top.category.to_string(), format_currency(top.total)),
        None => ("None".to_owned(), format_currency(0.0)),
    };

    html! {
        section id="summary-cards" class="grid w-full grid-cols-1 gap-4 md:grid-cols-2 lg:grid-cols-4"
        {
            (summary_card("Total Spent", &format_currency(summary.total_spent), "All time"))
            (summary_card("Expenses", &summary.expense_count.to_string(), "Recorded so far"))
            (summary_card("Average Expense", &format_currency(summary.average_expense), "Per expense"))
            (summary_card("Top Category", &top_category.0, &top_category.1))
        }
    }
}

fn summary_card(title: &str, value: &str, caption: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            p class="text-2xl font-bold" { (value) }
            p class="text-xs text-gray-500 dark:text-gray-400" { (caption) }
        }
    }
}

/// The width of a progress bar for `progress_percent`.
///
/// The percentage itself is never clamped, only the bar so it fits its track.
fn progress_bar_width(progress_percent: f64) -> f64 {
    progress_percent.clamp(0.0, 100.0)
}

/// Renders a progress bar per budget, red once a budget is overspent.
pub(super) fn budget_status_view(statuses: &[BudgetStatus]) -> Markup {
    html! {
        section id="budget-status" class={(CARD_STYLE) " space-y-4"}
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-xl font-semibold" { "Budget Status" }
                span class="text-sm text-gray-600 dark:text-gray-400" { "This month" }
            }

            @if statuses.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    (NO_BUDGETS_MESSAGE) " "
                    (link(endpoints::BUDGETS_VIEW, "Set a budget"))
                }
            }

            @for status in statuses {
                @let is_over_budget = status.progress_percent > 100.0;
                @let bar_colour = if is_over_budget { "bg-red-600" } else { "bg-blue-600" };

                div class="space-y-1" data-category=(status.category)
                {
                    div class="flex justify-between text-sm"
                    {
                        span class="font-medium" { (status.category) }
                        span class="text-gray-600 dark:text-gray-400"
                        {
                            (format_currency(status.spent)) " / " (format_currency(status.budget_amount))
                        }
                    }

                    div
                        class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
                        role="progressbar"
                        aria-valuenow=(format!("{:.0}", status.progress_percent))
                        aria-valuemin="0"
                        aria-valuemax="100"
                    {
                        div
                            class={"h-2.5 rounded-full " (bar_colour)}
                            style=(format!("width: {:.0}%", progress_bar_width(status.progress_percent)))
                        {}
                    }

                    @if is_over_budget {
                        p class="text-xs text-red-600 dark:text-red-400"
                        {
                            "Over budget by " (format_currency(status.spent - status.budget_amount))
                        }
                    }
                }
            }
        }
    }
}

/// Renders the latest expenses, `expenses` should already be sorted newest first.
pub(super) fn recent_expenses_view(expenses: &[Expense], local_offset: UtcOffset) -> Markup {
    html! {
        section id="recent-expenses" class={(CARD_STYLE) " space-y-4"}
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-xl font-semibold" { "Recent Expenses" }
                (link(endpoints::EXPENSES_VIEW, "View all"))
            }

            ul class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for expense in expenses.iter().take(RECENT_EXPENSE_COUNT) {
                    li class="flex items-center justify-between py-3"
                    {
                        div
                        {
                            p class="font-medium" { (expense.description) }
                            p class="text-xs text-gray-500 dark:text-gray-400"
                            {
                                (expense.date.to_offset(local_offset).date()) " "
                                span class=(CATEGORY_BADGE_STYLE) { (expense.category) }
                            }
                        }
                        span class="font-semibold" { (format_currency(expense.amount)) }
                    }
                }
            }
        }
    }
}

/// Renders the card that asks the assistant for a summary of the last week.
pub(super) fn weekly_summary_card_view() -> Markup {
    html! {
        section class={(CARD_STYLE) " flex flex-col gap-4"}
        {
            h3 class="text-xl font-semibold" { "Weekly AI Summary" }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Get AI-powered insights on your spending over the last 7 days."
            }

            div id="weekly-summary" class="flex-1 text-sm"
            {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "Click the button to generate your weekly spending analysis."
                }
            }

            button
                type="button"
                hx-post=(endpoints::WEEKLY_SUMMARY)
                hx-target="#weekly-summary"
                hx-target-error="#alert-container"
                hx-disabled-elt="this"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" { (loading_spinner()) }
                " Generate Summary"
            }
        }
    }
}
