//! Defines the expense model, input validation and database queries for expenses.

use rusqlite::{Connection, Row};
use serde::Deserialize;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::{Category, Error, ValidationErrors, database_id::ExpenseId};

/// The format of a calendar date, e.g. "2024-01-31".
const CALENDAR_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// MODELS
// ============================================================================

/// A single purchase that has been recorded.
///
/// Expenses are only ever created through [create_expense], which guarantees
/// that every field is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The ID assigned by the database.
    pub id: ExpenseId,
    /// What the money was spent on, never empty.
    pub description: String,
    /// How much was spent, always positive.
    pub amount: f64,
    /// The classification of the expense.
    pub category: Category,
    /// When the money was spent, normalised to UTC.
    pub date: OffsetDateTime,
}

/// The unvalidated fields for a new expense, e.g. from a submitted form.
///
/// Every field is kept as text so that a blank or malformed field becomes a
/// field error instead of failing form decoding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpenseInput {
    /// What the money was spent on.
    pub description: String,
    /// How much was spent, e.g. "12.50".
    pub amount: String,
    /// The name of the category, e.g. "Food".
    pub category: String,
    /// Either an RFC 3339 timestamp or a calendar date such as "2024-01-31".
    ///
    /// Calendar dates are interpreted as midnight in the local timezone.
    pub date: String,
}

impl ExpenseInput {
    /// Check every field and collect all of the problems.
    fn validate(&self, local_offset: UtcOffset) -> Result<ValidatedExpense, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", "Description is required.");
        }

        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && *amount > 0.0);
        if amount.is_none() {
            errors.add("amount", "Amount must be a number greater than zero.");
        }

        let category = match self.category.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                errors.add(
                    "category",
                    format!(
                        "Category must be one of {}.",
                        Category::ALL.map(Category::as_str).join(", ")
                    ),
                );
                None
            }
        };

        let date = parse_expense_date(&self.date, local_offset);
        if date.is_none() {
            errors.add(
                "date",
                "Date must be a calendar date (YYYY-MM-DD) or an RFC 3339 timestamp.",
            );
        }

        match (amount, category, date) {
            (Some(amount), Some(category), Some(date)) if errors.is_empty() => Ok(ValidatedExpense {
                description: description.to_owned(),
                amount,
                category,
                date,
            }),
            _ => Err(errors),
        }
    }
}

struct ValidatedExpense {
    description: String,
    amount: f64,
    category: Category,
    date: OffsetDateTime,
}

/// Parse the date text of an [ExpenseInput] into a UTC timestamp.
///
/// Accepts RFC 3339 timestamps, e.g. "2024-01-31T23:59:59Z", and calendar
/// dates, e.g. "2024-01-31", which are taken as midnight at `local_offset`.
pub fn parse_expense_date(text: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timestamp.to_offset(UtcOffset::UTC));
    }

    Date::parse(text, CALENDAR_DATE_FORMAT).ok().map(|date| {
        PrimitiveDateTime::new(date, Time::MIDNIGHT)
            .assume_offset(local_offset)
            .to_offset(UtcOffset::UTC)
    })
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Validate `input` and store it as a new expense.
///
/// Calendar dates in `input` are interpreted at `local_offset`.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] listing every invalid field,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    input: &ExpenseInput,
    local_offset: UtcOffset,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = input.validate(local_offset)?;

    let expense = connection
        .prepare(
            "INSERT INTO expense (description, amount, category, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, description, amount, category, date",
        )?
        .query_row(
            (
                expense.description,
                expense.amount,
                expense.category,
                expense.date,
            ),
            map_expense_row,
        )?;

    tracing::debug!("Created expense {}", expense.id);

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare("SELECT id, description, amount, category, date FROM expense WHERE id = :id")?
        .query_one(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Retrieve every expense, most recent first.
///
/// Expenses with the same date are ordered by creation, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut expenses = connection
        .prepare("SELECT id, description, amount, category, date FROM expense")?
        .query_map([], map_expense_row)?
        .collect::<Result<Vec<_>, _>>()?;

    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    Ok(expenses)
}

/// Count the stored expenses.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_expenses(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(*) FROM expense", [], |row| row.get(0))?;

    Ok(count as usize)
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);",
        (),
    )?;

    Ok(())
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let date = row.get(4)?;

    Ok(Expense {
        id,
        description,
        amount,
        category,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
