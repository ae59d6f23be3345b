//! The page that reports on the expenses in a date range.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{
    Date, Duration, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    AppState, CategoryTotal, Error, Expense, ValidationErrors,
    aggregation::group_by_category,
    alert::Alert,
    endpoints,
    expense::{expense_row_view, get_expenses},
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency, page_header,
    },
    navigation::NavBar,
    report::{day_bounds, filter_by_date_range, period_total},
    timezone::{local_offset_or_error, now_local},
};

/// The number of days, including today, covered when no range is given.
const DEFAULT_REPORT_DAYS: i64 = 30;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The date range requested in the query string, e.g. `?from=2024-01-01&to=2024-01-31`.
///
/// Missing or blank dates fall back to the last 30 days.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// The first day of the report.
    pub from: Option<String>,
    /// The last day of the report.
    pub to: Option<String>,
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateRange {
    from: Date,
    to: Date,
}

/// Renders the report for the requested date range.
///
/// An invalid range is shown as an alert on the page with a 422 status.
pub async fn get_reports_page(
    State(state): State<ReportsPageState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;
    let today = now_local(local_offset).date();

    let range = match parse_range(&query, today) {
        Ok(range) => range,
        Err(errors) => {
            tracing::error!("invalid report range {query:?}: {errors}");
            let view = invalid_range_view(&query, errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, view).into_response());
        }
    };

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses(&connection)
            .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?
    };

    let (from, to) = day_bounds(range.from, range.to, local_offset);
    let expenses = filter_by_date_range(&expenses, from, to);

    Ok(report_view(range, &expenses, local_offset).into_response())
}

fn parse_range(query: &ReportQuery, today: Date) -> Result<DateRange, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let mut parse_date = |field: &'static str, text: Option<&String>, default: Date| {
        match text.map(|text| text.trim()).filter(|text| !text.is_empty()) {
            None => Some(default),
            Some(text) => Date::parse(text, DATE_FORMAT)
                .inspect_err(|_| {
                    errors.add(field, format!("\"{text}\" is not a date in the form YYYY-MM-DD."))
                })
                .ok(),
        }
    };

    let from = parse_date(
        "from",
        query.from.as_ref(),
        today - Duration::days(DEFAULT_REPORT_DAYS - 1),
    );
    let to = parse_date("to", query.to.as_ref(), today);

    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ValidationErrors::single(
            "from",
            "The start date must be on or before the end date.",
        )),
        (Some(from), Some(to)) => Ok(DateRange { from, to }),
        _ => Err(errors),
    }
}

fn range_form_view(from: &str, to: &str) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::REPORTS_VIEW)
            class={(CARD_STYLE) " flex flex-col gap-4 sm:flex-row sm:items-end"}
        {
            div class="flex-1"
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    name="from"
                    id="from"
                    type="date"
                    value=(from)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex-1"
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    name="to"
                    id="to"
                    type="date"
                    value=(to)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="sm:w-40"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update" }
            }
        }
    }
}

fn invalid_range_view(query: &ReportQuery, errors: ValidationErrors) -> Markup {
    let alert = Alert::ErrorList {
        message: "Invalid date range".to_owned(),
        details: errors
            .errors()
            .iter()
            .map(|error| error.message.clone())
            .collect(),
    };

    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (page_header("Reports", None))

            div class="w-full space-y-6"
            {
                (range_form_view(
                    query.from.as_deref().unwrap_or_default(),
                    query.to.as_deref().unwrap_or_default(),
                ))

                (alert.into_html())
            }
        }
    };

    base("Reports", &[], &content)
}

fn report_view(range: DateRange, expenses: &[Expense], local_offset: UtcOffset) -> Markup {
    let total = period_total(expenses);
    let category_totals = group_by_category(expenses);

    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            (page_header("Reports", Some("Spending between two dates, inclusive.")))

            div class="w-full space-y-6"
            {
                (range_form_view(&range.from.to_string(), &range.to.to_string()))

                div class="grid gap-4 sm:grid-cols-2"
                {
                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-600 dark:text-gray-400" { "Total spent" }
                        p id="period-total" class="text-3xl font-bold" { (format_currency(total)) }
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            (range.from) " to " (range.to)
                        }
                    }

                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-600 dark:text-gray-400" { "Expenses" }
                        p class="text-3xl font-bold" { (expenses.len()) }
                    }
                }

                (category_breakdown_view(&category_totals, total))

                section
                {
                    h2 class="text-xl font-semibold mb-4" { "Expenses" }

                    div class="relative overflow-x-auto shadow-md rounded-lg"
                    {
                        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                                }
                            }

                            tbody id="report-expenses"
                            {
                                @for expense in expenses {
                                    (expense_row_view(expense, local_offset))
                                }

                                @if expenses.is_empty() {
                                    tr class=(TABLE_ROW_STYLE)
                                    {
                                        td colspan="4" class={(TABLE_CELL_STYLE) " text-center"}
                                        {
                                            "No expenses in this period."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Reports", &[], &content)
}

fn category_breakdown_view(category_totals: &[CategoryTotal], total: f64) -> Markup {
    if category_totals.is_empty() {
        return html! {};
    }

    html! {
        section
        {
            h2 class="text-xl font-semibold mb-4" { "By Category" }

            div class="relative overflow-x-auto shadow-md rounded-lg"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Total" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Share" }
                        }
                    }

                    tbody id="category-breakdown"
                    {
                        @for category_total in category_totals {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    span class=(CATEGORY_BADGE_STYLE) { (category_total.category) }
                                }
                                td class={(TABLE_CELL_STYLE) " text-right"}
                                {
                                    (format_currency(category_total.total))
                                }
                                td class={(TABLE_CELL_STYLE) " text-right"}
                                {
                                    (format!("{:.0}%", category_total.total / total * 100.0))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{UtcOffset, macros::date};

    use crate::{
        db::initialize,
        expense::{ExpenseInput, create_expense},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{DateRange, ReportQuery, ReportsPageState, get_reports_page, parse_range};

    fn get_test_state() -> ReportsPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ReportsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn add_expense(
        state: &ReportsPageState,
        description: &str,
        amount: f64,
        category: &str,
        date: &str,
    ) {
        let input = ExpenseInput {
            description: description.to_owned(),
            amount: amount.to_string(),
            category: category.to_owned(),
            date: date.to_owned(),
        };
        create_expense(&input, UtcOffset::UTC, &state.db_connection.lock().unwrap()).unwrap();
    }

    fn query(from: &str, to: &str) -> ReportQuery {
        ReportQuery {
            from: Some(from.to_owned()),
            to: Some(to.to_owned()),
        }
    }

    fn select_text(html: &Html, selector: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[test]
    fn missing_dates_default_to_last_thirty_days() {
        let got = parse_range(&ReportQuery::default(), date!(2024-03-31)).unwrap();

        assert_eq!(
            got,
            DateRange {
                from: date!(2024-03-02),
                to: date!(2024-03-31)
            }
        );
    }

    #[test]
    fn blank_dates_use_defaults() {
        let got = parse_range(&query("", " "), date!(2024-03-31)).unwrap();

        assert_eq!(got.to, date!(2024-03-31));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let errors = parse_range(&query("01/02/2024", "nope"), date!(2024-03-31)).unwrap_err();

        assert!(errors.has_error_for("from"));
        assert!(errors.has_error_for("to"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let errors =
            parse_range(&query("2024-02-01", "2024-01-01"), date!(2024-03-31)).unwrap_err();

        assert!(errors.has_error_for("from"));
    }

    #[tokio::test]
    async fn report_includes_whole_last_day() {
        let state = get_test_state();
        add_expense(&state, "Rent", 100.0, "Rent", "2024-01-01");
        add_expense(&state, "Late snack", 10.0, "Food", "2024-01-31T23:59:59Z");
        add_expense(&state, "Next month", 99.0, "Food", "2024-02-01");

        let response = get_reports_page(State(state), Query(query("2024-01-01", "2024-01-31")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "#period-total"), vec!["$110.00"]);
        let rows = select_text(&html, "#report-expenses tr");
        assert_eq!(rows.len(), 2, "got {rows:?}");
        assert!(rows[0].contains("Late snack"), "got {rows:?}");
        assert!(rows[1].contains("Rent"), "got {rows:?}");
    }

    #[tokio::test]
    async fn report_breaks_down_by_category_largest_first() {
        let state = get_test_state();
        add_expense(&state, "Lunch", 10.0, "Food", "2024-01-02");
        add_expense(&state, "Dinner", 5.0, "Food", "2024-01-03");
        add_expense(&state, "Train", 20.0, "Transport", "2024-01-04");

        let response = get_reports_page(State(state), Query(query("2024-01-01", "2024-01-31")))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let rows = select_text(&html, "#category-breakdown tr");
        assert_eq!(rows.len(), 2, "got {rows:?}");
        assert!(rows[0].starts_with("Transport"), "got {rows:?}");
        assert!(rows[1].starts_with("Food"), "got {rows:?}");
    }

    #[tokio::test]
    async fn reversed_range_renders_alert() {
        let response = get_reports_page(
            State(get_test_state()),
            Query(query("2024-02-01", "2024-01-01")),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("The start date must be on or before the end date."),
            "got {text}"
        );
    }
}
