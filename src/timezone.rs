//! Conversions between UTC timestamps and calendar days in the configured timezone.

use time::{Date, OffsetDateTime};
use time_tz::{OffsetDateTimeExt, Tz};

use crate::Error;

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}

/// The calendar day `timestamp` falls on in `timezone`.
pub fn local_date(timestamp: OffsetDateTime, timezone: &Tz) -> Date {
    timestamp.to_timezone(timezone).date()
}
