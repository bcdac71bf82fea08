//! UTC timestamp formatting for DATE-TIME properties.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Format as an RFC 5545 UTC DATE-TIME, e.g. `20260205T120000Z`.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Interpret a wall-clock time in `tz` and convert it to UTC.
///
/// Ambiguous times (clocks turned back) resolve to the earlier instant.
/// Times that do not exist in `tz` (clocks turned forward) are an error.
pub fn local_to_utc(local: &NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, String> {
    match tz.from_local_datetime(local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(format!("{} does not exist in timezone {}", local, tz.name())),
    }
}
