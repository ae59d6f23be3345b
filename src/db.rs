//! Database schema set-up and whole-database operations.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, budget::create_budget_table, expense::create_expense_table};

/// Create the all of the database tables for the application.
///
/// Safe to call on an existing database, tables are only created if they are missing.
///
/// # Errors
/// This function may return a [rusqlite::Error] if something went wrong creating the tables.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_expense_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Delete every expense and budget.
///
/// Both tables are cleared in a single transaction so a failure leaves all
/// data in place.
///
/// # Errors
/// Returns [Error::SqlError] if the transaction could not be completed.
pub fn clear_all_data(connection: &Connection) -> Result<(), Error> {
    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    let transaction = connection.unchecked_transaction()?;

    transaction.execute("DELETE FROM expense", [])?;
    transaction.execute("DELETE FROM budget", [])?;

    transaction.commit()?;

    tracing::info!("Cleared all expenses and budgets");

    Ok(())
}
