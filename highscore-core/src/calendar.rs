//! Calendar arithmetic for day bucketing and streak math.
//!
//! All day-level comparisons in this crate go through this module so the
//! DST handling lives in exactly one place. Day differences are computed on
//! local calendar dates ([`chrono::NaiveDate`] subtraction), not on raw
//! timestamp deltas, so a 23- or 25-hour day around a DST transition still
//! counts as exactly one day.
//!
//! Functions are generic over [`chrono::TimeZone`] so tests can pin a fixed
//! offset; `Local`-bound wrappers cover the common case.

use chrono::{Local, NaiveDate, TimeZone};

/// Local calendar date containing `instant_ms`, or `None` for instants
/// outside chrono's representable range.
pub fn local_date_in<Tz: TimeZone>(tz: &Tz, instant_ms: i64) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(instant_ms)
        .earliest()
        .map(|dt| dt.date_naive())
}

/// Millisecond timestamp of local midnight for the calendar day containing
/// `instant_ms`.
///
/// In zones where midnight itself is skipped by a DST transition, the first
/// valid instant of the day is returned instead.
pub fn day_start_in<Tz: TimeZone>(tz: &Tz, instant_ms: i64) -> Option<i64> {
    let date = local_date_in(tz, instant_ms)?;
    for hour in 0..3u32 {
        if let Some(start) = date
            .and_hms_opt(hour, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        {
            return Some(start.timestamp_millis());
        }
    }
    None
}

/// Signed whole-day difference between the local calendar dates of two
/// instants. Positive when `a_ms` falls on a later date than `b_ms`.
///
/// Instants with no representable local date contribute a difference of 0;
/// callers that care must guard upstream.
pub fn days_diff_in<Tz: TimeZone>(tz: &Tz, a_ms: i64, b_ms: i64) -> i64 {
    match (local_date_in(tz, a_ms), local_date_in(tz, b_ms)) {
        (Some(a), Some(b)) => (a - b).num_days(),
        _ => 0,
    }
}

/// [`local_date_in`] bound to the host's local timezone.
pub fn local_date(instant_ms: i64) -> Option<NaiveDate> {
    local_date_in(&Local, instant_ms)
}

/// [`day_start_in`] bound to the host's local timezone.
pub fn day_start(instant_ms: i64) -> Option<i64> {
    day_start_in(&Local, instant_ms)
}

/// [`days_diff_in`] bound to the host's local timezone.
pub fn days_diff(a_ms: i64, b_ms: i64) -> i64 {
    days_diff_in(&Local, a_ms, b_ms)
}
