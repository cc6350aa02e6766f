//! Time utilities: pin ledger dates to a time of day that survives timezones.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

/// Midday UTC on `date`.
///
/// Any display offset within +/-12h still lands on the same calendar day.
pub fn at_midday_utc(date: NaiveDate) -> DateTime<Utc> {
    (date.and_time(NaiveTime::MIN) + TimeDelta::hours(12)).and_utc()
}
