//! Wall-clock resolution in a schedule's timezone
//!
//! Both functions fail closed: an unknown timezone never errors to the
//! caller, it degrades to the evaluating process's clock (local for the
//! minute, UTC for the date).

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Minutes since local midnight in `timezone` at `instant`, in [0, 1439]
pub fn minute_of_day(timezone: &str, instant: DateTime<Utc>) -> u32 {
    match timezone.parse::<Tz>() {
        Ok(tz) => {
            let local = tz.from_utc_datetime(&instant.naive_utc());
            local.hour() * 60 + local.minute()
        }
        Err(_) => {
            warn!(timezone = %timezone, "unknown timezone, falling back to process-local clock");
            let local = Local.from_utc_datetime(&instant.naive_utc());
            local.hour() * 60 + local.minute()
        }
    }
}

/// Local calendar date "YYYY-MM-DD" in `timezone` at `instant`
pub fn local_date(timezone: &str, instant: DateTime<Utc>) -> String {
    match timezone.parse::<Tz>() {
        Ok(tz) => {
            let local = tz.from_utc_datetime(&instant.naive_utc());
            format!("{:04}-{:02}-{:02}", local.year(), local.month(), local.day())
        }
        Err(_) => {
            warn!(timezone = %timezone, "unknown timezone, falling back to UTC date");
            format!(
                "{:04}-{:02}-{:02}",
                instant.year(),
                instant.month(),
                instant.day()
            )
        }
    }
}
