//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the `ExpenseInput` used to create one
//! - Database functions for storing and querying expenses
//! - The expenses page, the create endpoint and the AI assist endpoints

mod assist_endpoints;
mod core;
mod create_endpoint;
mod expenses_page;

pub use assist_endpoints::{parse_expense_endpoint, suggest_category_endpoint};
pub use core::{
    Expense, ExpenseInput, count_expenses, create_expense, create_expense_table, get_expense,
    get_expenses,
};
pub use create_endpoint::create_expense_endpoint;
pub use expenses_page::get_expenses_page;
pub(crate) use expenses_page::expense_row_view;
