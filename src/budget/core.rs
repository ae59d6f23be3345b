//! Defines the budget model and the database queries for budgets.

use std::collections::HashSet;

use rusqlite::{Connection, Row};

use crate::{Category, Error, ValidationErrors};

/// A monthly spending cap for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    /// The category the cap applies to.
    pub category: Category,
    /// The most that should be spent in a month, never negative.
    pub amount: f64,
}

/// Replace every stored budget with `budgets`.
///
/// The order of `budgets` is kept so that [get_budgets] returns them in the
/// same order. The whole set is written in one transaction: either every
/// budget is replaced or none are.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if a category appears more than once or an amount is
///   negative or not finite, in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_budgets(budgets: &[Budget], connection: &Connection) -> Result<(), Error> {
    validate_budgets(budgets)?;

    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let transaction = connection.unchecked_transaction()?;

    transaction.execute("DELETE FROM budget", [])?;

    {
        let mut statement = transaction
            .prepare("INSERT INTO budget (position, category, amount) VALUES (?1, ?2, ?3)")?;

        for (position, budget) in budgets.iter().enumerate() {
            statement.execute((position as i64, budget.category, budget.amount))?;
        }
    }

    transaction.commit()?;

    tracing::debug!("Saved {} budgets", budgets.len());

    Ok(())
}

/// Retrieve the budgets in the order they were last set.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare("SELECT category, amount FROM budget ORDER BY position ASC")?
        .query_map([], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Count the categories with a budget.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_budgets(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(*) FROM budget", [], |row| row.get(0))?;

    Ok(count as usize)
}

fn validate_budgets(budgets: &[Budget]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut seen = HashSet::new();

    for budget in budgets {
        if !seen.insert(budget.category) {
            errors.add(
                "category",
                format!("{} has more than one budget.", budget.category),
            );
        }

        if !budget.amount.is_finite() || budget.amount < 0.0 {
            errors.add(
                "amount",
                format!(
                    "The budget for {} must be zero or a positive number.",
                    budget.category
                ),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                position INTEGER PRIMARY KEY,
                category TEXT NOT NULL UNIQUE,
                amount REAL NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let category = row.get(0)?;
    let amount = row.get(1)?;

    Ok(Budget { category, amount })
}
