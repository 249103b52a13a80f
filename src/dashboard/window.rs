//! Trailing date windows for the charts.

use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime};

use crate::Error;

/// The longest window a client may ask for, roughly ten years.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Query parameters for routes that report over a trailing window.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    /// How many days back to look, defaults to the server's configured window.
    pub window_days: Option<u32>,
}

impl WindowQuery {
    /// The requested number of days or `default_days` if none was requested.
    ///
    /// # Errors
    /// Returns [Error::InvalidWindow] if the requested number of days is zero
    /// or larger than [MAX_WINDOW_DAYS].
    pub fn days_or(&self, default_days: u32) -> Result<u32, Error> {
        Window::validate_days(self.window_days.unwrap_or(default_days))
    }
}

/// The trailing window of `days` days ending at a reference time.
///
/// The window covers `days` calendar days ending with the local day of the
/// reference time, so a 30 day window on the 31st covers the 2nd to the 31st
/// inclusive. Timestamps are included from exactly `days` days before the
/// reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start_time: OffsetDateTime,
    start_date: Date,
    end_date: Date,
}

impl Window {
    /// Check that `days` is a valid window length.
    ///
    /// # Errors
    /// Returns [Error::InvalidWindow] if `days` is zero or larger than [MAX_WINDOW_DAYS].
    pub fn validate_days(days: u32) -> Result<u32, Error> {
        if days == 0 || days > MAX_WINDOW_DAYS {
            return Err(Error::InvalidWindow(days));
        }

        Ok(days)
    }

    /// The window of `days` days ending at `now`, where `today` is the
    /// calendar day of `now` in the local timezone.
    pub fn trailing(now: OffsetDateTime, today: Date, days: u32) -> Self {
        let length = Duration::days(i64::from(days));
        let earlier_days = Duration::days(i64::from(days.saturating_sub(1)));

        Self {
            start_time: now.checked_sub(length).unwrap_or(now),
            start_date: today.checked_sub(earlier_days).unwrap_or(Date::MIN),
            end_date: today,
        }
    }

    /// The first instant included in the window.
    pub fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }

    /// The first calendar day included in the window.
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Whether the calendar day `date` falls within the window.
    pub fn contains(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
