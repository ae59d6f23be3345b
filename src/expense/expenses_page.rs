//! The page for listing expenses and recording new ones.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, UtcOffset};

use crate::{
    AppState, Category, Error, endpoints,
    expense::{Expense, get_expenses},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CARD_STYLE, CATEGORY_BADGE_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, dollar_input_styles, format_currency, link,
        loading_spinner, page_header,
    },
    navigation::NavBar,
    timezone::{local_offset_or_error, now_local},
};

/// The ID of the element wrapping the expense form fields, replaced by the parse assist.
pub(super) const EXPENSE_FIELDS_ID: &str = "expense-fields";
/// The ID of the element wrapping the category select, replaced by the category assist.
pub(super) const CATEGORY_FIELD_ID: &str = "category-field";

/// The values used to prefill the expense form.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ExpenseFormValues {
    pub description: String,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub date: Date,
}

impl ExpenseFormValues {
    /// An empty form dated `today`.
    pub fn empty(today: Date) -> Self {
        Self {
            description: String::new(),
            amount: None,
            category: None,
            date: today,
        }
    }
}

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of the expenses page, e.g. `?sort=amount&order=asc`.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// The column to sort by, "date" or "amount".
    pub sort: Option<String>,
    /// The sort direction, "asc" or "desc".
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SortColumn {
    #[default]
    Date,
    Amount,
}

impl SortColumn {
    fn as_str(self) -> &'static str {
        match self {
            SortColumn::Date => "date",
            SortColumn::Amount => "amount",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    fn reversed(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// How the expense table is ordered, newest first unless the query says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ExpenseSort {
    column: SortColumn,
    order: SortOrder,
}

impl ExpenseSort {
    /// Unknown or missing values fall back to the default.
    fn from_query(query: &ExpensesQuery) -> Self {
        let column = match query.sort.as_deref().map(str::trim) {
            Some("amount") => SortColumn::Amount,
            Some("date") | Some("") | None => SortColumn::Date,
            Some(other) => {
                tracing::debug!("Ignoring unknown sort column {other:?}");
                SortColumn::Date
            }
        };

        let order = match query.order.as_deref().map(str::trim) {
            Some("asc") => SortOrder::Ascending,
            Some("desc") | Some("") | None => SortOrder::Descending,
            Some(other) => {
                tracing::debug!("Ignoring unknown sort order {other:?}");
                SortOrder::Descending
            }
        };

        Self { column, order }
    }

    /// The link for a column header: clicking the active column flips the order.
    fn toggle_url(self, column: SortColumn) -> String {
        let order = if self.column == column {
            self.order.reversed()
        } else {
            SortOrder::Descending
        };

        format!(
            "{}?sort={}&order={}",
            endpoints::EXPENSES_VIEW,
            column.as_str(),
            order.as_str()
        )
    }

    /// Reorder `expenses`, which must already be sorted newest first.
    ///
    /// Equal amounts keep newest first.
    fn apply(self, expenses: &mut [Expense]) {
        match (self.column, self.order) {
            (SortColumn::Date, SortOrder::Descending) => {}
            (SortColumn::Date, SortOrder::Ascending) => {
                expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
            }
            (SortColumn::Amount, SortOrder::Descending) => {
                expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount));
            }
            (SortColumn::Amount, SortOrder::Ascending) => {
                expenses.sort_by(|a, b| a.amount.total_cmp(&b.amount));
            }
        }
    }
}

/// Renders the list of expenses with the form for adding a new one.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;

    let mut expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses(&connection)
            .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?
    };

    let sort = ExpenseSort::from_query(&query);
    sort.apply(&mut expenses);

    let today = now_local(local_offset).date();

    Ok(expenses_view(&expenses, sort, today, local_offset).into_response())
}

fn expenses_view(
    expenses: &[Expense],
    sort: ExpenseSort,
    today: Date,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (page_header("Expenses", Some("Record what you spend and see where it went.")))

            div class="grid w-full gap-6 lg:grid-cols-3"
            {
                div class="space-y-6"
                {
                    (quick_add_view())
                    (new_expense_form_view(&ExpenseFormValues::empty(today)))
                }

                div class="lg:col-span-2"
                {
                    (expense_table_view(expenses, sort, local_offset))
                }
            }
        }
    };

    base("Expenses", &[dollar_input_styles()], &content)
}

/// A form that asks the assistant to fill in the expense form from a sentence.
fn quick_add_view() -> Markup {
    html! {
        form
            id="quick-add-form"
            hx-post=(endpoints::PARSE_EXPENSE)
            hx-target={"#" (EXPENSE_FIELDS_ID)}
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class={(CARD_STYLE) " space-y-4"}
        {
            h2 class="text-xl font-bold" { "Quick Add" }

            div
            {
                label for="text" class=(FORM_LABEL_STYLE)
                {
                    "Describe the expense"
                }

                input
                    name="text"
                    id="text"
                    type="text"
                    placeholder="e.g. Spent 12.50 on lunch at the cafe"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE)
            {
                span class="inline htmx-indicator" { (loading_spinner()) }
                " Fill in form"
            }
        }
    }
}

fn new_expense_form_view(values: &ExpenseFormValues) -> Markup {
    html! {
        form
            id="expense-form"
            hx-post=(endpoints::EXPENSES_API)
            hx-target-error="#alert-container"
            class={(CARD_STYLE) " space-y-4"}
        {
            h2 class="text-xl font-bold" { "New Expense" }

            (expense_fields_view(values))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" { (loading_spinner()) }
                " Add Expense"
            }
        }
    }
}

/// The inputs of the new expense form, prefilled with `values`.
pub(super) fn expense_fields_view(values: &ExpenseFormValues) -> Markup {
    html! {
        div id=(EXPENSE_FIELDS_ID) class="space-y-4"
        {
            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    value=(values.description)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        value=[values.amount.map(|amount| format!("{amount:.2}"))]
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            (category_field_view(values.category))

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="date"
                    value=(values.date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    }
}

/// The category select with a button that asks the assistant for a suggestion.
pub(super) fn category_field_view(selected: Option<Category>) -> Markup {
    html! {
        div id=(CATEGORY_FIELD_ID)
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            div class="flex gap-2"
            {
                select
                    name="category"
                    id="category"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" disabled selected[selected.is_none()] { "Select a category" }

                    @for category in Category::ALL {
                        option
                            value=(category.as_str())
                            selected[selected == Some(category)]
                        {
                            (category.as_str())
                        }
                    }
                }

                button
                    type="button"
                    hx-post=(endpoints::SUGGEST_CATEGORY)
                    hx-include="#description"
                    hx-target={"#" (CATEGORY_FIELD_ID)}
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Suggest"
                }
            }
        }
    }
}

/// A sortable column header.
fn sort_header_view(
    title: &str,
    column: SortColumn,
    sort: ExpenseSort,
    extra_class: &str,
) -> Markup {
    let aria_sort = (sort.column == column).then_some(match sort.order {
        SortOrder::Ascending => "ascending",
        SortOrder::Descending => "descending",
    });
    let arrow = match aria_sort {
        Some("ascending") => " ↑",
        Some(_) => " ↓",
        None => "",
    };

    html! {
        th scope="col" class={(TABLE_CELL_STYLE) (extra_class)} aria-sort=[aria_sort]
        {
            (link(&sort.toggle_url(column), &format!("{title}{arrow}")))
        }
    }
}

fn expense_table_view(
    expenses: &[Expense],
    sort: ExpenseSort,
    local_offset: UtcOffset,
) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        (sort_header_view("Date", SortColumn::Date, sort, ""))
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        (sort_header_view("Amount", SortColumn::Amount, sort, " text-right"))
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        (expense_row_view(expense, local_offset))
                    }

                    @if expenses.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="4" class={(TABLE_CELL_STYLE) " text-center"}
                            {
                                "No expenses yet. Add one with the form."
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A table row for one expense, shared with the reports page.
pub(crate) fn expense_row_view(expense: &Expense, local_offset: UtcOffset) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (expense.date.to_offset(local_offset).date()) }
            td class=(TABLE_CELL_STYLE) { (expense.description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (expense.category.as_str()) }
            }
            td class={(TABLE_CELL_STYLE) " text-right"} { (format_currency(expense.amount)) }
        }
    }
}
