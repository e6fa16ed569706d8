//! Time utilities: the timezone policy used to place events into months.
//!
//! Events are stored as Unix seconds. Month keys are derived in one explicit
//! IANA timezone per call, UTC unless the caller says otherwise.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::{LocalDateError, SkipReason};
use crate::month::MonthKey;

/// Timezone used when the caller does not configure one.
pub const DEFAULT_TIMEZONE: Tz = Tz::UTC;

/// Parse an IANA timezone name like "America/Chicago" or "UTC".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Month key for a Unix-seconds timestamp, as seen from `tz`.
pub fn month_key_for(secs: i64, tz: &Tz) -> Result<MonthKey, SkipReason> {
    let utc = DateTime::from_timestamp(secs, 0).ok_or(SkipReason::OutOfRange(secs))?;
    MonthKey::from_datetime(&utc.with_timezone(tz)).ok_or(SkipReason::OutOfRange(secs))
}

/// Parse a local wall-clock date like "2024-01-15" or "2024-01-15 09:30" in
/// `tz`, returning Unix seconds.
///
/// A bare date means the first instant of that local day: midnight, or the
/// end of the gap when a clock change skips midnight. An explicit time that
/// falls inside a gap is `LocalDateError::Nonexistent`. Ambiguous times take
/// the earlier instant.
pub fn parse_local_date(local: &str, tz: &Tz) -> Result<i64, LocalDateError> {
    let local = local.trim();

    if let Ok(ndt) = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M") {
        return tz
            .from_local_datetime(&ndt)
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| LocalDateError::Nonexistent(local.to_string(), tz.to_string()));
    }

    let date = NaiveDate::parse_from_str(local, "%Y-%m-%d")
        .map_err(|_| LocalDateError::Format(local.to_string()))?;
    start_of_local_day(date, tz)
        .map(|dt| dt.timestamp())
        .ok_or_else(|| LocalDateError::Nonexistent(local.to_string(), tz.to_string()))
}

/// First instant of `date` that exists in `tz`, searched in 15-minute steps.
/// `None` only when the whole day was skipped.
fn start_of_local_day(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    (0..24 * 4)
        .map(|step| midnight + TimeDelta::minutes(15 * step))
        .take_while(|ndt| ndt.date() == date)
        .find_map(|ndt| tz.from_local_datetime(&ndt).earliest())
}
