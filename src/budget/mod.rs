//! Monthly spending caps per category.
//!
//! This module contains the `Budget` model with its database functions, the
//! budgets page and the endpoint that replaces the budget set.

mod budgets_page;
mod core;
mod update_endpoint;

pub use budgets_page::get_budgets_page;
pub use core::{Budget, count_budgets, create_budget_table, get_budgets, set_budgets};
pub use update_endpoint::update_budgets_endpoint;
