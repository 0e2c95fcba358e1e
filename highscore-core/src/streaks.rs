//! Streak and break computation over the day-bucketed history.
//!
//! Fully recomputed on each call from the aggregate table and raw log; no
//! state is carried between invocations. "Today" and "now" are explicit
//! parameters so the math stays pure and testable.

use crate::calendar::days_diff_in;
use crate::types::{DayAggregate, GoalStatus, Goals, Hit};
use chrono::{Local, NaiveDate, TimeZone};

/// Sorted active dates (count > 0), ascending.
fn active_dates(aggregates: &[DayAggregate]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = aggregates
        .iter()
        .filter(|a| a.count > 0)
        .map(|a| a.date)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Consecutive active days anchored at `today`.
///
/// The streak is counted backward from the most recent active day. If that
/// day is more than one day before `today` the streak is broken and the
/// result is 0; a streak whose last active day was yesterday still counts.
pub fn current_streak(aggregates: &[DayAggregate], today: NaiveDate) -> u32 {
    let dates = active_dates(aggregates);
    let Some(&latest) = dates.last() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1u32;
    for pair in dates.windows(2).rev() {
        if (pair[1] - pair[0]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of calendar-consecutive active days over the full history.
///
/// Always greater than or equal to [`current_streak`].
pub fn longest_streak(aggregates: &[DayAggregate]) -> u32 {
    let dates = active_dates(aggregates);
    if dates.is_empty() {
        return 0;
    }

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }
    longest
}

/// Whole days since the most recent hit, 0 for an empty log.
pub fn current_break_in<Tz: TimeZone>(tz: &Tz, hits: &[Hit], now_ms: i64) -> i64 {
    hits.iter()
        .map(|h| h.timestamp_ms)
        .max()
        .map(|latest| days_diff_in(tz, now_ms, latest).max(0))
        .unwrap_or(0)
}

/// Longest whole-day gap between chronologically consecutive hits,
/// including the still-open gap from the last hit to `now_ms`.
///
/// Always greater than or equal to [`current_break_in`] for the same `now`.
pub fn longest_break_in<Tz: TimeZone>(tz: &Tz, hits: &[Hit], now_ms: i64) -> i64 {
    if hits.is_empty() {
        return 0;
    }

    let mut timestamps: Vec<i64> = hits.iter().map(|h| h.timestamp_ms).collect();
    timestamps.sort_unstable();

    let mut longest = 0i64;
    for pair in timestamps.windows(2) {
        longest = longest.max(days_diff_in(tz, pair[1], pair[0]));
    }
    longest.max(current_break_in(tz, hits, now_ms))
}

/// [`current_break_in`] bound to the host's local timezone.
pub fn current_break(hits: &[Hit], now_ms: i64) -> i64 {
    current_break_in(&Local, hits, now_ms)
}

/// [`longest_break_in`] bound to the host's local timezone.
pub fn longest_break(hits: &[Hit], now_ms: i64) -> i64 {
    longest_break_in(&Local, hits, now_ms)
}

/// Project today's activity against the configured goals.
///
/// `current_break_days` comes from [`current_break_in`]; a limit or
/// threshold of 0 disables the corresponding check.
pub fn goal_status(
    aggregates: &[DayAggregate],
    goals: &Goals,
    today: NaiveDate,
    current_break_days: i64,
) -> GoalStatus {
    let today_count = aggregates
        .iter()
        .find(|a| a.date == today)
        .map(|a| a.count)
        .unwrap_or(0);

    let (over_limit, remaining) = if goals.daily_limit > 0 {
        (
            today_count > goals.daily_limit,
            Some(goals.daily_limit.saturating_sub(today_count)),
        )
    } else {
        (false, None)
    };

    GoalStatus {
        today_count,
        daily_limit: goals.daily_limit,
        over_limit,
        remaining,
        t_break_due: goals.t_break_days > 0 && current_break_days >= goals.t_break_days as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HitSource;
    use chrono::FixedOffset;

    const DAY_MS: i64 = 86_400_000;
    const DAY1: i64 = 1_741_478_400_000; // 2025-03-09 00:00:00 UTC

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn agg(day: u32, count: u32) -> DayAggregate {
        DayAggregate::new(date(day), count)
    }

    fn hit(id: &str, ts: i64) -> Hit {
        Hit {
            id: id.to_string(),
            timestamp_ms: ts,
            strain_name: String::new(),
            strain_price: 0.0,
            duration_ms: 0,
            source: HitSource::Manual,
        }
    }

    #[test]
    fn test_current_streak_anchored_today() {
        let aggs = vec![agg(7, 1), agg(8, 2), agg(9, 3)];
        assert_eq!(current_streak(&aggs, date(9)), 3);
    }

    #[test]
    fn test_current_streak_counts_from_yesterday() {
        // No hits today, but yesterday closed a 2-day run
        let aggs = vec![agg(7, 1), agg(8, 2)];
        assert_eq!(current_streak(&aggs, date(9)), 2);
    }

    #[test]
    fn test_current_streak_broken_after_gap() {
        let aggs = vec![agg(5, 1), agg(6, 1)];
        assert_eq!(current_streak(&aggs, date(9)), 0);
    }

    #[test]
    fn test_current_streak_stops_at_gap() {
        let aggs = vec![agg(3, 1), agg(4, 1), agg(6, 1), agg(8, 1), agg(9, 1)];
        assert_eq!(current_streak(&aggs, date(9)), 2);
    }

    #[test]
    fn test_longest_streak() {
        let aggs = vec![agg(1, 1), agg(2, 1), agg(3, 1), agg(4, 1), agg(8, 1), agg(9, 1)];
        assert_eq!(longest_streak(&aggs), 4);
    }

    #[test]
    fn test_longest_at_least_current() {
        let aggs = vec![agg(6, 1), agg(7, 1), agg(8, 1), agg(9, 1)];
        let current = current_streak(&aggs, date(9));
        assert!(longest_streak(&aggs) >= current);
        assert_eq!(current, 4);
    }

    #[test]
    fn test_zero_count_days_do_not_extend_streaks() {
        let aggs = vec![agg(7, 1), agg(8, 0), agg(9, 1)];
        assert_eq!(current_streak(&aggs, date(9)), 1);
        assert_eq!(longest_streak(&aggs), 1);
    }

    #[test]
    fn test_breaks() {
        let hits = vec![
            hit("1", DAY1 + 9 * 3_600_000),
            hit("2", DAY1 + 18 * 3_600_000),
            hit("3", DAY1 + 2 * DAY_MS + 9 * 3_600_000),
        ];
        let now = DAY1 + 2 * DAY_MS + 12 * 3_600_000;
        assert_eq!(current_break_in(&utc(), &hits, now), 0);
        assert_eq!(longest_break_in(&utc(), &hits, now), 2);
    }

    #[test]
    fn test_break_includes_open_gap() {
        let hits = vec![hit("1", DAY1)];
        let now = DAY1 + 5 * DAY_MS;
        assert_eq!(current_break_in(&utc(), &hits, now), 5);
        assert!(longest_break_in(&utc(), &hits, now) >= 5);
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        assert_eq!(current_streak(&[], date(9)), 0);
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(current_break_in(&utc(), &[], DAY1), 0);
        assert_eq!(longest_break_in(&utc(), &[], DAY1), 0);
    }

    #[test]
    fn test_goal_status_limits() {
        let aggs = vec![agg(9, 5)];
        let goals = Goals {
            daily_limit: 4,
            t_break_days: 3,
        };
        let status = goal_status(&aggs, &goals, date(9), 0);
        assert!(status.over_limit);
        assert_eq!(status.remaining, Some(0));
        assert!(!status.t_break_due);

        let idle = goal_status(&[], &goals, date(9), 3);
        assert!(idle.t_break_due);
        assert_eq!(idle.today_count, 0);
    }

    #[test]
    fn test_goal_status_unlimited() {
        let status = goal_status(&[agg(9, 50)], &Goals::default(), date(9), 100);
        assert!(!status.over_limit);
        assert_eq!(status.remaining, None);
        assert!(!status.t_break_due);
    }
}
