//! Composite scoring of recent usage habits.
//!
//! Two independent 0-100 models: a tolerance index over the last 7 recorded
//! days (how hard the body is being pushed right now) and a habit score
//! over the last 14 (how entrenched the pattern is), plus a weekday/weekend
//! split and a small set of rule-based recommendations.

use crate::types::DayAggregate;
use chrono::{Datelike, Weekday};
use serde::Serialize;

/// Entries needed before a tolerance index is meaningful.
const TOLERANCE_WINDOW: usize = 7;
/// Entries needed before a habit score is meaningful.
const HABIT_WINDOW: usize = 14;
/// Daily average treated as the 100%-volume ceiling.
const VOLUME_CEILING: f64 = 15.0;

fn recent_sorted(aggregates: &[DayAggregate], window: usize) -> Vec<DayAggregate> {
    let mut sorted: Vec<DayAggregate> = aggregates.to_vec();
    sorted.sort_by_key(|a| a.date);
    let start = sorted.len().saturating_sub(window);
    sorted.split_off(start)
}

// ============================================
// Tolerance index
// ============================================

/// Band classification of the tolerance index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceLevel {
    Low,
    Medium,
    High,
}

impl ToleranceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToleranceLevel::Low => "low",
            ToleranceLevel::Medium => "medium",
            ToleranceLevel::High => "high",
        }
    }

    fn from_index(index: u32) -> Self {
        if index > 70 {
            ToleranceLevel::High
        } else if index > 40 {
            ToleranceLevel::Medium
        } else {
            ToleranceLevel::Low
        }
    }
}

/// Composite 0-100 estimate of recent usage intensity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToleranceIndex {
    pub index: u32,
    pub level: ToleranceLevel,
    /// Days with at least one hit inside the 7-entry window
    pub active_days: u32,
    /// Mean daily count over the window
    pub avg_daily: f64,
}

/// Tolerance index over the most recent 7 recorded days.
///
/// Returns `None` with fewer than 7 entries. The composite weights are
/// 0.4 frequency + 0.4 volume + 0.2 frequency again; the third term
/// deliberately reuses the frequency score rather than a separate
/// break-frequency metric, a coupling inherited from the product design.
pub fn tolerance_index(aggregates: &[DayAggregate]) -> Option<ToleranceIndex> {
    if aggregates.len() < TOLERANCE_WINDOW {
        return None;
    }
    let window = recent_sorted(aggregates, TOLERANCE_WINDOW);

    let active_days = window.iter().filter(|a| a.count > 0).count() as u32;
    let total: u32 = window.iter().map(|a| a.count).sum();
    let avg_daily = f64::from(total) / TOLERANCE_WINDOW as f64;

    let frequency_score = f64::from(active_days) / TOLERANCE_WINDOW as f64 * 100.0;
    let volume_score = (avg_daily / VOLUME_CEILING * 100.0).min(100.0);
    let index = (0.4 * frequency_score + 0.4 * volume_score + 0.2 * frequency_score).round() as u32;

    Some(ToleranceIndex {
        index,
        level: ToleranceLevel::from_index(index),
        active_days,
        avg_daily,
    })
}

// ============================================
// Weekday/weekend split
// ============================================

/// Hit totals split by weekday versus weekend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeekSplit {
    pub weekday: u32,
    pub weekend: u32,
    /// Rounded integer percentage, 0 when there are no hits
    pub weekday_percent: u32,
    pub weekend_percent: u32,
}

/// Sum counts by weekday/weekend classification (Sat/Sun = weekend).
pub fn weekday_vs_weekend(aggregates: &[DayAggregate]) -> WeekSplit {
    let mut weekday = 0u32;
    let mut weekend = 0u32;
    for agg in aggregates {
        match agg.date.weekday() {
            Weekday::Sat | Weekday::Sun => weekend += agg.count,
            _ => weekday += agg.count,
        }
    }

    let total = weekday + weekend;
    let (weekday_percent, weekend_percent) = if total > 0 {
        (
            (f64::from(weekday) / f64::from(total) * 100.0).round() as u32,
            (f64::from(weekend) / f64::from(total) * 100.0).round() as u32,
        )
    } else {
        (0, 0)
    };

    WeekSplit {
        weekday,
        weekend,
        weekday_percent,
        weekend_percent,
    }
}

// ============================================
// Habit score
// ============================================

/// Band classification of the habit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitRating {
    Sporadic,
    Balanced,
    Intensive,
}

impl HabitRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitRating::Sporadic => "sporadic",
            HabitRating::Balanced => "balanced",
            HabitRating::Intensive => "intensive",
        }
    }

    fn from_score(score: u32) -> Self {
        if score < 40 {
            HabitRating::Sporadic
        } else if score > 75 {
            HabitRating::Intensive
        } else {
            HabitRating::Balanced
        }
    }
}

/// Composite 0-100 blend of consistency, frequency, and moderation over a
/// 14-entry window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitScore {
    pub score: u32,
    pub rating: HabitRating,
    pub active_days: u32,
    /// Consecutive-active-day run ending at the newest window entry
    pub current_streak: u32,
    /// Longest consecutive-active-day run inside the window
    pub longest_streak: u32,
}

/// Habit score over the most recent 14 recorded days.
///
/// Returns `None` with fewer than 14 entries. Streaks here are scanned
/// inside the window only and are independent of the full-history streaks
/// in [`crate::streaks`]. Moderation penalizes near-daily use: 12 or more
/// active days of 14 costs 20 points per day past 11.
pub fn habit_score(aggregates: &[DayAggregate]) -> Option<HabitScore> {
    if aggregates.len() < HABIT_WINDOW {
        return None;
    }
    let window = recent_sorted(aggregates, HABIT_WINDOW);

    let active: Vec<&DayAggregate> = window.iter().filter(|a| a.count > 0).collect();
    let active_days = active.len() as u32;

    let mut longest = 0u32;
    let mut run = 0u32;
    for pair in active.windows(2) {
        if run == 0 {
            run = 1;
        }
        if (pair[1].date - pair[0].date).num_days() == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }
    if active.len() == 1 {
        longest = 1;
    }

    // Backward scan from the newest active entry
    let mut current = 0u32;
    if !active.is_empty() {
        current = 1;
        for pair in active.windows(2).rev() {
            if (pair[1].date - pair[0].date).num_days() == 1 {
                current += 1;
            } else {
                break;
            }
        }
    }

    let consistency = (f64::from(longest) / HABIT_WINDOW as f64 * 100.0).min(100.0);
    let frequency = f64::from(active_days) / HABIT_WINDOW as f64 * 100.0;
    let moderation = if active_days < 12 {
        100.0
    } else {
        (100.0 - f64::from(active_days - 11) * 20.0).max(0.0)
    };

    let score = (0.3 * consistency + 0.3 * frequency + 0.4 * moderation).round() as u32;

    Some(HabitScore {
        score,
        rating: HabitRating::from_score(score),
        active_days,
        current_streak: current,
        longest_streak: longest,
    })
}

// ============================================
// Recommendations
// ============================================

/// Identifier for a recommendation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Active nearly every day of the last week
    RestDay,
    /// Average daily count in the last week is high
    ReduceIntensity,
    /// Active most of the last month
    ToleranceBreak,
}

/// A matched heuristic with its fixed confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub message: String,
    /// Fixed per-rule confidence percentage
    pub confidence: u8,
}

/// Evaluate the static recommendation heuristics, newest history first.
///
/// Deterministic for a given input; at most three rules can match. Windows
/// are calendar-relative to the newest recorded date so pruned zero-count
/// days do not inflate the counts.
pub fn recommendations(aggregates: &[DayAggregate]) -> Vec<Recommendation> {
    let Some(latest) = aggregates.iter().map(|a| a.date).max() else {
        return Vec::new();
    };

    let in_window = |days: i64| {
        aggregates
            .iter()
            .filter(move |a| (latest - a.date).num_days() < days && a.count > 0)
    };

    let week_active = in_window(7).count() as u32;
    let week_total: u32 = in_window(7).map(|a| a.count).sum();
    let week_avg = f64::from(week_total) / 7.0;
    let month_active = in_window(30).count() as u32;

    let mut out = Vec::new();

    if week_active >= 6 {
        out.push(Recommendation {
            kind: RecommendationKind::RestDay,
            title: "Schedule a rest day".to_string(),
            message: format!(
                "You were active {} of the last 7 days. A day off helps keep tolerance down.",
                week_active
            ),
            confidence: 85,
        });
    }

    if week_avg > 12.0 {
        out.push(Recommendation {
            kind: RecommendationKind::ReduceIntensity,
            title: "Ease off the daily volume".to_string(),
            message: format!(
                "You averaged {:.1} hits per day this week. Consider smaller sessions.",
                week_avg
            ),
            confidence: 75,
        });
    }

    if month_active > 25 {
        out.push(Recommendation {
            kind: RecommendationKind::ToleranceBreak,
            title: "Consider a tolerance break".to_string(),
            message: format!(
                "{} active days in the last 30. A multi-day break resets tolerance fastest.",
                month_active
            ),
            confidence: 90,
        });
    }

    out
}
