//! Route handlers for administrators.
//!
//! Everything here works across all users and is only reachable through
//! [crate::auth::admin_guard].

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod charts;
mod stats;
mod transactions;
mod users;

pub use charts::get_chart_data;
pub use stats::get_app_stats;
pub use transactions::{delete_any_transaction, get_all_transactions};
pub use users::{delete_user_endpoint, get_users};

/// The state needed by the admin routes.
#[derive(Debug, Clone)]
pub struct AdminState {
    /// The database connection for reading and deleting any user's data.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The window used when the client does not ask for one.
    pub default_window_days: u32,
}

impl FromRef<AppState> for AdminState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            default_window_days: state.default_window_days,
        }
    }
}
