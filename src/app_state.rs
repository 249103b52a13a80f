//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, dashboard::Window, db::initialize, timezone::get_timezone};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Calendar days in reports and the check for future dates use this timezone.
    pub local_timezone: String,

    /// How many days back the charts look when the client does not ask for a window.
    pub default_window_days: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if:
    /// - the database cannot be initialized,
    /// - `local_timezone` is not a known timezone,
    /// - or `default_window_days` is not a valid window length.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        default_window_days: u32,
    ) -> Result<Self, Error> {
        get_timezone(local_timezone)?;
        Window::validate_days(default_window_days)?;
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: local_timezone.to_owned(),
            default_window_days,
        })
    }
}
