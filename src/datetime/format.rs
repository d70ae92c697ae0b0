//! ISO-8601 detection, parsing and canonical formatting.
//!
//! # Accepted layouts
//! - `YYYY-MM-DD` (midnight UTC)
//! - `YYYY-MM-DDTHH:mm:ss` (interpreted as UTC)
//! - `YYYY-MM-DDTHH:mm:ss.s` .. `YYYY-MM-DDTHH:mm:ss.sss`
//! - any time variant followed by `Z` or `±HH:MM`
//!
//! # Design Decisions
//! - Lexical match first, then calendar validation (Feb 30 is rejected)
//! - Only the dash-separated, `T`-delimited layout is accepted; locale formats
//!   such as `10/25/2025` never match
//! - Output is always `YYYY-MM-DDTHH:mm:ss.sssZ`

use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, SecondsFormat, SubsecRound, TimeZone,
    Utc,
};
use regex::Regex;

/// Lexical shape of every accepted value. `[0-9]` rather than `\d` keeps
/// non-ASCII digits out.
static ISO_8601: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})(?:T([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,3}))?(Z|[+-][0-9]{2}:[0-9]{2})?)?$",
    )
    .expect("ISO-8601 pattern is a valid regex")
});

/// Shortest accepted value is `YYYY-MM-DD`.
const MIN_LEN: usize = 10;

/// Returns true if `value` is an ISO-8601 date or date-time that denotes an
/// existing instant.
pub fn is_date_time_string(value: &str) -> bool {
    parse_date_time(value).is_some()
}

/// Parse an ISO-8601 string into a native date/time.
///
/// Returns `None` for anything [`is_date_time_string`] rejects. The offset
/// written in the input is kept; zone-less values carry a UTC offset.
pub fn parse_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    if !has_date_prefix(value) {
        return None;
    }

    let caps = ISO_8601.captures(value)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let Some(hour) = caps.get(4) else {
        return Some(utc().from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    };
    let hour: u32 = hour.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
    let second: u32 = caps.get(6)?.as_str().parse().ok()?;
    let millis = match caps.get(7) {
        Some(fraction) => fraction_to_millis(fraction.as_str())?,
        None => 0,
    };
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => utc(),
        Some(zone) => parse_offset(zone)?,
    };

    offset.from_local_datetime(&date.and_time(time)).single()
}

/// Format an instant as `YYYY-MM-DDTHH:mm:ss.sssZ`, folding any offset into
/// UTC and truncating below milliseconds.
pub fn to_canonical<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    value
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current instant, truncated to the millisecond precision of the wire format.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Cheap pre-filter: at least `YYYY-MM-DD` long with dashes in place.
fn has_date_prefix(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= MIN_LEN && bytes[4] == b'-' && bytes[7] == b'-'
}

/// `5` → 500, `05` → 50, `123` → 123.
fn fraction_to_millis(fraction: &str) -> Option<u32> {
    let digits: u32 = fraction.parse().ok()?;
    match fraction.len() {
        1 => Some(digits * 100),
        2 => Some(digits * 10),
        3 => Some(digits),
        _ => None,
    }
}

/// Parse `+HH:MM` / `-HH:MM`.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let sign = match zone.get(..1)? {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = zone.get(1..3)?.parse().ok()?;
    let minutes: i32 = zone.get(4..6)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn utc() -> FixedOffset {
    Utc.fix()
}
