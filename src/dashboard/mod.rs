//! Dashboard module
//!
//! Summarises transactions for the dashboards: totals, a daily series of
//! income and expenses, the combined transaction feed and daily sign ups.

mod aggregation;
mod handlers;
mod window;

pub use aggregation::{
    DailyBucket, SignupBucket, Totals, combined_feed, daily_series, signup_series, totals,
};
pub use handlers::get_dashboard_data;
pub use window::{MAX_WINDOW_DAYS, Window, WindowQuery};
