//! Dashboard module
//!
//! Provides an overview page with headline statistics, spending charts,
//! budget progress for the current month and an AI summary of the last week.

mod cards;
mod charts;
mod handlers;
mod weekly_summary;

pub use handlers::get_dashboard_page;
pub use weekly_summary::weekly_summary_endpoint;
