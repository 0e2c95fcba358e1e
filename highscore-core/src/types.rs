//! Core domain types for highscore
//!
//! These types represent the raw event log and its derived day-bucketed
//! history, plus the read-only host state (settings, goals) the engines
//! consume.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Hit** | A single recorded consumption event with timestamp and strain attribution |
//! | **DayAggregate** | The day-bucketed count derived from the hit log; canonical history |
//! | **Streak** | A run of calendar-consecutive days each containing at least one hit |
//! | **Break** | A gap, in whole days, with no qualifying hits |
//! | **Settings** | Current bowl size, mix ratio, and strain list (host-owned, read-only here) |
//! | **Goals** | Daily limit and tolerance-break reminder thresholds (host-owned) |
//!
//! The hit log is append-only from the core's perspective: hits are created
//! and deleted by the host, never mutated. Everything else in this crate is
//! a pure function of the log and these inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================
// Hit
// ============================================

/// How a hit was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSource {
    /// Logged by the user holding the button
    Manual,
    /// Logged by the hardware sensor collaborator
    Sensor,
}

impl HitSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitSource::Manual => "manual",
            HitSource::Sensor => "sensor",
        }
    }
}

impl std::str::FromStr for HitSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(HitSource::Manual),
            "sensor" => Ok(HitSource::Sensor),
            _ => Err(format!("unknown hit source: {}", s)),
        }
    }
}

/// A single recorded consumption event.
///
/// Immutable once created except by deletion. Timestamps are milliseconds
/// since the Unix epoch; a `duration_ms` of 0 means "unknown/not measured".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Unique identifier across the log (host guarantees uniqueness)
    pub id: String,
    /// Milliseconds since epoch
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    /// Strain label at the time of recording
    #[serde(rename = "strainName", default)]
    pub strain_name: String,
    /// Price per gram at the time of recording
    #[serde(rename = "strainPrice", default)]
    pub strain_price: f64,
    /// Measured hold duration in milliseconds, 0 if not measured
    #[serde(rename = "duration", default)]
    pub duration_ms: i64,
    /// How the hit was recorded
    #[serde(rename = "type", default = "default_source")]
    pub source: HitSource,
}

fn default_source() -> HitSource {
    HitSource::Manual
}

impl Hit {
    /// Whether this hit carries a usable timestamp and sane numeric fields.
    ///
    /// Malformed hits are skipped by time- and cost-bucketed counters but
    /// still counted toward unambiguous totals (see the achievements module).
    pub fn is_well_formed(&self) -> bool {
        self.timestamp_ms > 0
            && self.strain_price.is_finite()
            && self.strain_price >= 0.0
            && self.duration_ms >= 0
    }
}

// ============================================
// DayAggregate
// ============================================

/// Day-bucketed hit count for one local calendar day.
///
/// Derived by [`crate::history::rebuild_history_from_hits`], the sole
/// writer of this type. Invariant: `count` equals the number of hits whose
/// local calendar date equals `date`. Only `note` is host-edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAggregate {
    /// Local calendar date; serializes as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Number of hits that day, always > 0 for stored entries
    pub count: u32,
    /// Optional free-text note attached by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl DayAggregate {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self {
            date,
            count,
            note: None,
        }
    }
}

// ============================================
// Settings and goals
// ============================================

/// A strain the user has configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strain {
    pub id: String,
    pub name: String,
    /// Price per gram
    #[serde(default)]
    pub price: f64,
}

/// Current host settings, used only to derive spending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Grams per bowl
    #[serde(rename = "bowlSize", default)]
    pub bowl_size: f64,
    /// Percentage of the bowl that is product, 0-100
    #[serde(rename = "weedRatio", default)]
    pub weed_ratio: f64,
    /// Ordered strain list
    #[serde(default)]
    pub strains: Vec<Strain>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bowl_size: 0.3,
            weed_ratio: 80.0,
            strains: Vec::new(),
        }
    }
}

/// User goals, read-only input to the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    /// Maximum hits per day, 0 = unlimited
    #[serde(rename = "dailyLimit", default)]
    pub daily_limit: u32,
    /// Reminder threshold for a tolerance break, in days, 0 = disabled
    #[serde(rename = "tBreakDays", default)]
    pub t_break_days: u32,
}

/// Projection of today's activity against the configured goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalStatus {
    /// Hits recorded today
    pub today_count: u32,
    /// Configured daily limit, 0 = unlimited
    pub daily_limit: u32,
    /// Whether today's count exceeds a non-zero limit
    pub over_limit: bool,
    /// Hits remaining under the limit, None when unlimited
    pub remaining: Option<u32>,
    /// Whether the current break has reached the T-break reminder threshold
    pub t_break_due: bool,
}
