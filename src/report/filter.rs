//! Date-range selection of expenses.

use time::{Date, OffsetDateTime, Time, UtcOffset, macros::time};

use crate::Expense;

/// Select the expenses dated between `from` and `to`, inclusive.
///
/// The input order is preserved. If `from` is later than `to` the result is
/// empty.
pub fn filter_by_date_range(
    expenses: &[Expense],
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| from <= expense.date && expense.date <= to)
        .cloned()
        .collect()
}

/// The sum of the amounts of `expenses`.
pub fn period_total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// Convert an inclusive range of calendar dates into timestamps.
///
/// Returns the first instant of `from` and the last instant of `to`, both in
/// the timezone given by `local_offset`.
pub fn day_bounds(
    from: Date,
    to: Date,
    local_offset: UtcOffset,
) -> (OffsetDateTime, OffsetDateTime) {
    let start = from.with_time(Time::MIDNIGHT).assume_offset(local_offset);
    let end = to.with_time(time!(23:59:59.999_999_999)).assume_offset(local_offset);

    (start, end)
}

/// The bounds of the calendar month containing `today`, see [day_bounds].
pub fn month_bounds(today: Date, local_offset: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
    let first_day = today.replace_day(1).unwrap_or(today);
    let last_day = first_day
        .replace_day(first_day.month().length(first_day.year()))
        .unwrap_or(today);

    day_bounds(first_day, last_day, local_offset)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, offset};

    use crate::{Category, Expense};

    use super::{day_bounds, filter_by_date_range, month_bounds, period_total};

    fn expense_on(id: i64, date: time::OffsetDateTime) -> Expense {
        Expense {
            id,
            description: format!("expense {id}"),
            amount: id as f64,
            category: Category::Food,
            date,
        }
    }

    #[test]
    fn filter_includes_end_of_last_day() {
        let inside = expense_on(1, datetime!(2024-01-31 23:59:59 UTC));
        let outside = expense_on(2, datetime!(2024-02-01 00:00 UTC));
        let (from, to) = day_bounds(date!(2024-01-01), date!(2024-01-31), offset!(UTC));

        let got = filter_by_date_range(&[inside.clone(), outside], from, to);

        assert_eq!(got, vec![inside]);
    }

    #[test]
    fn filter_is_inclusive_on_both_bounds() {
        let from = datetime!(2024-03-01 00:00 UTC);
        let to = datetime!(2024-03-10 00:00 UTC);
        let expenses = vec![
            expense_on(1, from),
            expense_on(2, to),
            expense_on(3, datetime!(2024-02-29 23:59:59 UTC)),
        ];

        let got = filter_by_date_range(&expenses, from, to);

        assert_eq!(got, expenses[..2].to_vec());
    }

    #[test]
    fn filter_preserves_input_order() {
        let expenses = vec![
            expense_on(3, datetime!(2024-03-03 00:00 UTC)),
            expense_on(1, datetime!(2024-03-01 00:00 UTC)),
            expense_on(2, datetime!(2024-03-02 00:00 UTC)),
        ];

        let got = filter_by_date_range(
            &expenses,
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-12-31 00:00 UTC),
        );

        assert_eq!(got, expenses);
    }

    #[test]
    fn filter_with_reversed_bounds_is_empty() {
        let expenses = vec![expense_on(1, datetime!(2024-03-05 00:00 UTC))];

        let got = filter_by_date_range(
            &expenses,
            datetime!(2024-03-10 00:00 UTC),
            datetime!(2024-03-01 00:00 UTC),
        );

        assert_eq!(got, vec![]);
    }

    #[test]
    fn period_total_sums_amounts() {
        let expenses = vec![
            expense_on(1, datetime!(2024-03-01 00:00 UTC)),
            expense_on(2, datetime!(2024-03-02 00:00 UTC)),
        ];

        assert_eq!(period_total(&expenses), 3.0);
        assert_eq!(period_total(&[]), 0.0);
    }

    #[test]
    fn day_bounds_respect_local_offset() {
        let (from, to) = day_bounds(date!(2024-01-01), date!(2024-01-31), offset!(+13));

        assert_eq!(from, datetime!(2023-12-31 11:00 UTC));
        assert_eq!(to, datetime!(2024-01-31 10:59:59.999_999_999 UTC));
    }

    #[test]
    fn month_bounds_cover_whole_month() {
        let (from, to) = month_bounds(date!(2024-02-14), offset!(UTC));

        assert_eq!(from, datetime!(2024-02-01 00:00 UTC));
        assert_eq!(to, datetime!(2024-02-29 23:59:59.999_999_999 UTC));
    }
}
