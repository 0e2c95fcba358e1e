//! History aggregation: rebuilds the day-bucketed count table from the raw
//! hit log.
//!
//! This module is the sole writer of [`DayAggregate`]. Every other engine
//! consumes its output instead of re-deriving counts from timestamps, which
//! keeps the two representations from drifting apart.

use crate::calendar::local_date_in;
use crate::types::{DayAggregate, Hit};
use chrono::{Local, TimeZone};
use std::collections::BTreeMap;

/// Rebuild the day-bucketed history from the raw hit log.
///
/// Groups hits by local calendar date and returns one [`DayAggregate`] per
/// distinct date, ascending by date. Idempotent: the same log always yields
/// identical output, ordering included. Hits whose timestamp has no
/// representable local date are skipped and logged.
pub fn rebuild_history_from_hits_in<Tz: TimeZone>(tz: &Tz, hits: &[Hit]) -> Vec<DayAggregate> {
    let mut buckets: BTreeMap<chrono::NaiveDate, u32> = BTreeMap::new();
    let mut skipped = 0u32;

    for hit in hits {
        match local_date_in(tz, hit.timestamp_ms) {
            Some(date) => *buckets.entry(date).or_insert(0) += 1,
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped hits with unrepresentable timestamps");
    }

    buckets
        .into_iter()
        .map(|(date, count)| DayAggregate::new(date, count))
        .collect()
}

/// [`rebuild_history_from_hits_in`] bound to the host's local timezone.
pub fn rebuild_history_from_hits(hits: &[Hit]) -> Vec<DayAggregate> {
    rebuild_history_from_hits_in(&Local, hits)
}
