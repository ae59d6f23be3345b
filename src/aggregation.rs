//! Spending aggregation: per-category totals, summary statistics and budget progress.
//!
//! Every function here is pure. Callers choose the subset of expenses to
//! aggregate, e.g. the current month or a report's date range.

use std::collections::HashMap;

use crate::{Budget, Category, Expense, report::period_total};

/// The amount spent in a single category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    /// The category the total is for.
    pub category: Category,
    /// The sum of the amounts of the expenses in `category`.
    pub total: f64,
}

/// How much of a budget has been spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    /// The budgeted category.
    pub category: Category,
    /// The budget for the category.
    pub budget_amount: f64,
    /// The amount spent in the category.
    pub spent: f64,
    /// `spent` as a percentage of `budget_amount`.
    ///
    /// Exceeds 100 when the budget is overspent and is 0 when the budget is 0.
    pub progress_percent: f64,
}

/// Headline statistics for a set of expenses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingSummary {
    /// The sum of every expense.
    pub total_spent: f64,
    /// The number of expenses.
    pub expense_count: usize,
    /// The mean expense amount, 0 when there are no expenses.
    pub average_expense: f64,
    /// The category with the most spending, if any.
    pub top_category: Option<CategoryTotal>,
}

/// Sum the amounts of `expenses` per category.
///
/// Only categories that appear in `expenses` get an entry. The result is
/// sorted from the largest total to the smallest, with equal totals kept in
/// canonical category order.
pub fn group_by_category(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<Category, f64> = HashMap::new();

    for expense in expenses {
        *totals.entry(expense.category).or_insert(0.0) += expense.amount;
    }

    let mut grouped: Vec<CategoryTotal> = Category::ALL
        .into_iter()
        .filter_map(|category| {
            totals
                .get(&category)
                .map(|&total| CategoryTotal { category, total })
        })
        .collect();

    // Stable sort, so ties stay in canonical order.
    grouped.sort_by(|a, b| b.total.total_cmp(&a.total));

    grouped
}

/// Compare spending in `expenses` against each of `budgets`.
///
/// Produces one status per budget in the same order as `budgets`. Categories
/// without a budget are ignored and budgets without spending report 0 spent.
pub fn evaluate_budgets(expenses: &[Expense], budgets: &[Budget]) -> Vec<BudgetStatus> {
    let spent_by_category: HashMap<Category, f64> = group_by_category(expenses)
        .into_iter()
        .map(|category_total| (category_total.category, category_total.total))
        .collect();

    budgets
        .iter()
        .map(|budget| {
            let spent = spent_by_category
                .get(&budget.category)
                .copied()
                .unwrap_or(0.0);

            let progress_percent = if budget.amount > 0.0 {
                spent / budget.amount * 100.0
            } else {
                0.0
            };

            BudgetStatus {
                category: budget.category,
                budget_amount: budget.amount,
                spent,
                progress_percent,
            }
        })
        .collect()
}

/// Calculate the total, count, mean and top category of `expenses`.
pub fn summarize_spending(expenses: &[Expense]) -> SpendingSummary {
    let total_spent = period_total(expenses);
    let expense_count = expenses.len();
    let average_expense = if expense_count == 0 {
        0.0
    } else {
        total_spent / expense_count as f64
    };

    SpendingSummary {
        total_spent,
        expense_count,
        average_expense,
        top_category: group_by_category(expenses).first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{Budget, Category, Expense};

    use super::{
        BudgetStatus, CategoryTotal, SpendingSummary, evaluate_budgets, group_by_category,
        summarize_spending,
    };

    fn expense(id: i64, category: Category, amount: f64) -> Expense {
        Expense {
            id,
            description: format!("expense {id}"),
            amount,
            category,
            date: datetime!(2024-01-15 12:00 UTC),
        }
    }

    fn budget(category: Category, amount: f64) -> Budget {
        Budget { category, amount }
    }

    #[test]
    fn group_by_category_sums_and_sorts_descending() {
        let expenses = vec![
            expense(1, Category::Food, 10.0),
            expense(2, Category::Food, 5.0),
            expense(3, Category::Transport, 20.0),
        ];

        let got = group_by_category(&expenses);

        assert_eq!(
            got,
            vec![
                CategoryTotal {
                    category: Category::Transport,
                    total: 20.0
                },
                CategoryTotal {
                    category: Category::Food,
                    total: 15.0
                },
            ]
        );
    }

    #[test]
    fn group_by_category_handles_empty_input() {
        assert_eq!(group_by_category(&[]), vec![]);
    }

    #[test]
    fn group_by_category_omits_unseen_categories() {
        let expenses = vec![expense(1, Category::Rent, 1500.0)];

        let got = group_by_category(&expenses);

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].category, Category::Rent);
    }

    #[test]
    fn group_by_category_keeps_canonical_order_for_ties() {
        let expenses = vec![
            expense(1, Category::Other, 10.0),
            expense(2, Category::Groceries, 10.0),
            expense(3, Category::Food, 10.0),
        ];

        let categories: Vec<Category> = group_by_category(&expenses)
            .into_iter()
            .map(|category_total| category_total.category)
            .collect();

        assert_eq!(
            categories,
            vec![Category::Food, Category::Groceries, Category::Other]
        );
    }

    #[test]
    fn group_by_category_conserves_total() {
        let expenses: Vec<Expense> = (1..=50)
            .map(|i| {
                let category = Category::ALL[i as usize % Category::ALL.len()];
                expense(i, category, i as f64 * 1.25)
            })
            .collect();
        let want: f64 = expenses.iter().map(|expense| expense.amount).sum();

        let got: f64 = group_by_category(&expenses)
            .iter()
            .map(|category_total| category_total.total)
            .sum();

        assert!((want - got).abs() < 1e-9, "want {want}, got {got}");
    }

    #[test]
    fn group_by_category_totals_match_their_expenses() {
        let expenses = vec![
            expense(1, Category::Food, 12.5),
            expense(2, Category::Utilities, 75.2),
            expense(3, Category::Food, 7.5),
            expense(4, Category::Groceries, 120.75),
        ];

        for category_total in group_by_category(&expenses) {
            let want: f64 = expenses
                .iter()
                .filter(|expense| expense.category == category_total.category)
                .map(|expense| expense.amount)
                .sum();

            assert_eq!(category_total.total, want);
        }
    }

    #[test]
    fn group_by_category_is_deterministic() {
        let expenses = vec![
            expense(1, Category::Entertainment, 30.0),
            expense(2, Category::Transport, 85.0),
            expense(3, Category::Food, 12.5),
        ];

        assert_eq!(group_by_category(&expenses), group_by_category(&expenses));
    }

    #[test]
    fn evaluate_budgets_reports_overspending() {
        let got = evaluate_budgets(
            &[expense(1, Category::Food, 25.0)],
            &[budget(Category::Food, 20.0)],
        );

        assert_eq!(
            got,
            vec![BudgetStatus {
                category: Category::Food,
                budget_amount: 20.0,
                spent: 25.0,
                progress_percent: 125.0,
            }]
        );
    }

    #[test]
    fn evaluate_budgets_keeps_budget_order_and_length() {
        let budgets = vec![
            budget(Category::Rent, 1500.0),
            budget(Category::Food, 400.0),
            budget(Category::Transport, 150.0),
        ];
        let expenses = vec![
            expense(1, Category::Food, 100.0),
            expense(2, Category::Entertainment, 30.0),
        ];

        let got = evaluate_budgets(&expenses, &budgets);

        let categories: Vec<Category> = got.iter().map(|status| status.category).collect();
        assert_eq!(
            categories,
            vec![Category::Rent, Category::Food, Category::Transport]
        );
        assert_eq!(got[0].spent, 0.0);
        assert_eq!(got[0].progress_percent, 0.0);
        assert_eq!(got[1].spent, 100.0);
        assert_eq!(got[1].progress_percent, 25.0);
    }

    #[test]
    fn evaluate_budgets_with_zero_budget_has_zero_progress() {
        let got = evaluate_budgets(
            &[expense(1, Category::Other, 50.0)],
            &[budget(Category::Other, 0.0)],
        );

        assert_eq!(got[0].spent, 50.0);
        assert_eq!(got[0].progress_percent, 0.0);
    }

    #[test]
    fn evaluate_budgets_without_budgets_is_empty() {
        assert_eq!(
            evaluate_budgets(&[expense(1, Category::Food, 10.0)], &[]),
            vec![]
        );
    }

    #[test]
    fn summarize_spending_of_nothing_is_zero() {
        assert_eq!(
            summarize_spending(&[]),
            SpendingSummary {
                total_spent: 0.0,
                expense_count: 0,
                average_expense: 0.0,
                top_category: None,
            }
        );
    }

    #[test]
    fn summarize_spending_finds_top_category() {
        let expenses = vec![
            expense(1, Category::Food, 10.0),
            expense(2, Category::Transport, 20.0),
            expense(3, Category::Food, 30.0),
        ];

        let got = summarize_spending(&expenses);

        assert_eq!(got.total_spent, 60.0);
        assert_eq!(got.expense_count, 3);
        assert_eq!(got.average_expense, 20.0);
        assert_eq!(
            got.top_category,
            Some(CategoryTotal {
                category: Category::Food,
                total: 40.0
            })
        );
    }
}
