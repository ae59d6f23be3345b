//! Date-range reports on spending.

mod filter;
mod reports_page;

pub use filter::{day_bounds, filter_by_date_range, month_bounds, period_total};
pub use reports_page::get_reports_page;
