//! Trend forecasting and anomaly detection over the day-bucketed history.
//!
//! Forecasting fits an ordinary least-squares line through the most recent
//! daily counts and projects it 7 and 30 days forward, reporting R² as a
//! confidence percentage. Anomaly detection flags Z-score spikes and the
//! single longest inactivity gap.

use crate::types::DayAggregate;
use chrono::NaiveDate;
use serde::Serialize;

/// Minimum history length for a trend fit.
const MIN_TREND_ENTRIES: usize = 7;
/// A fit only looks at the most recent window of this many entries.
const TREND_WINDOW: usize = 30;
/// Minimum history length for anomaly detection.
const MIN_ANOMALY_ENTRIES: usize = 10;
/// Maximum anomalies reported per evaluation.
const MAX_ANOMALIES: usize = 5;

// ============================================
// Trend prediction
// ============================================

/// Direction of the fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }

    /// Classify a fitted slope. Slopes within ±0.5 hits/day are stable.
    fn from_slope(slope: f64) -> Self {
        if slope > 0.5 {
            TrendDirection::Increasing
        } else if slope < -0.5 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Linear-regression forecast of daily hit counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPrediction {
    /// Classified direction of the fitted line
    pub trend: TrendDirection,
    /// Fitted slope in hits per day
    pub slope: f64,
    /// Projected daily count 7 days out, never negative
    pub prediction_7d: u32,
    /// Projected daily count 30 days out, never negative
    pub prediction_30d: u32,
    /// R² of the fit as a percentage, clamped to 0-100
    pub confidence: f64,
    /// Mean daily count over the fitted window
    pub avg_daily: f64,
    /// Whether there was enough history to fit at all
    pub sufficient_data: bool,
}

impl TrendPrediction {
    /// Sentinel returned when fewer than 7 days of history exist.
    pub fn insufficient() -> Self {
        Self {
            trend: TrendDirection::Stable,
            slope: 0.0,
            prediction_7d: 0,
            prediction_30d: 0,
            confidence: 0.0,
            avg_daily: 0.0,
            sufficient_data: false,
        }
    }
}

/// Fit a trend over the most recent 30 days of history.
///
/// Returns [`TrendPrediction::insufficient`] when fewer than 7 entries are
/// available. Projections are clamped at zero; a constant series reports
/// confidence 100 (the flat line is a perfect fit).
pub fn predict_trend(aggregates: &[DayAggregate]) -> TrendPrediction {
    if aggregates.len() < MIN_TREND_ENTRIES {
        return TrendPrediction::insufficient();
    }

    let mut window: Vec<&DayAggregate> = aggregates.iter().collect();
    window.sort_by_key(|a| a.date);
    let start = window.len().saturating_sub(TREND_WINDOW);
    let counts: Vec<f64> = window[start..].iter().map(|a| f64::from(a.count)).collect();

    let n = counts.len() as f64;
    let sum_x: f64 = (0..counts.len()).map(|i| i as f64).sum();
    let sum_y: f64 = counts.iter().sum();
    let sum_xy: f64 = counts.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..counts.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    // Degenerate only for n < 2, which the entry minimum already excludes.
    let slope = if denominator.abs() > f64::EPSILON {
        (n * sum_xy - sum_x * sum_y) / denominator
    } else {
        0.0
    };
    let intercept = (sum_y - slope * sum_x) / n;

    // Project from the last fitted index, so "7 days out" means 7 days
    // after the newest entry in the window.
    let last_x = n - 1.0;
    let project = |days_ahead: f64| -> u32 {
        let value = slope * (last_x + days_ahead) + intercept;
        value.round().max(0.0) as u32
    };

    let mean = sum_y / n;
    let ss_res: f64 = counts
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();
    let ss_tot: f64 = counts.iter().map(|y| (y - mean).powi(2)).sum();

    let confidence = if ss_tot.abs() < f64::EPSILON {
        // Constant series: perfect fit if the line reproduces it exactly.
        if ss_res.abs() < f64::EPSILON {
            100.0
        } else {
            0.0
        }
    } else {
        ((1.0 - ss_res / ss_tot) * 100.0).clamp(0.0, 100.0)
    };

    let prediction = TrendPrediction {
        trend: TrendDirection::from_slope(slope),
        slope,
        prediction_7d: project(7.0),
        prediction_30d: project(30.0),
        confidence,
        avg_daily: mean,
        sufficient_data: true,
    };

    tracing::debug!(
        slope,
        confidence,
        trend = prediction.trend.as_str(),
        window = counts.len(),
        "Fitted consumption trend"
    );

    prediction
}

// ============================================
// Anomaly detection
// ============================================

/// Kind of detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A day whose count deviates far above the historical mean
    Spike,
    /// An extended inactivity gap, likely a tolerance break
    TBreak,
}

/// Severity of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One detected anomaly in the daily history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// The day the anomaly refers to (for breaks, the first inactive day)
    pub date: NaiveDate,
    pub kind: AnomalyKind,
    pub severity: Severity,
    /// Human-readable description for the presentation layer
    pub message: String,
    /// Z-score for spikes, absent for breaks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
}

/// Detect usage anomalies across the full history.
///
/// Requires at least 10 entries, otherwise returns empty. Spikes are days
/// whose count sits more than 2 population standard deviations above the
/// mean (High severity beyond 3σ). The single longest zero-count gap
/// between active days is reported once as a Low-severity break when it
/// exceeds 2 days. At most 5 anomalies are returned, spikes first in date
/// order, the break appended last.
pub fn detect_anomalies(aggregates: &[DayAggregate]) -> Vec<Anomaly> {
    if aggregates.len() < MIN_ANOMALY_ENTRIES {
        return Vec::new();
    }

    let mut sorted: Vec<&DayAggregate> = aggregates.iter().collect();
    sorted.sort_by_key(|a| a.date);

    let counts: Vec<f64> = sorted.iter().map(|a| f64::from(a.count)).collect();
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<f64>() / n;
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mut anomalies = Vec::new();

    if std_dev > f64::EPSILON {
        for agg in &sorted {
            if agg.count == 0 {
                continue;
            }
            let z = (f64::from(agg.count) - mean) / std_dev;
            if z > 2.0 {
                let severity = if z > 3.0 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                anomalies.push(Anomaly {
                    date: agg.date,
                    kind: AnomalyKind::Spike,
                    severity,
                    message: format!(
                        "{} hits on {}, well above your daily average of {:.1}",
                        agg.count, agg.date, mean
                    ),
                    z_score: Some(z),
                });
            }
        }
    }

    // Longest inactivity gap: days strictly between consecutive active days.
    let active: Vec<NaiveDate> = sorted
        .iter()
        .filter(|a| a.count > 0)
        .map(|a| a.date)
        .collect();
    let mut longest_gap = 0i64;
    let mut gap_start: Option<NaiveDate> = None;
    for pair in active.windows(2) {
        let between = (pair[1] - pair[0]).num_days() - 1;
        if between > longest_gap {
            longest_gap = between;
            gap_start = pair[0].succ_opt();
        }
    }
    if longest_gap > 2 {
        if let Some(start) = gap_start {
            anomalies.push(Anomaly {
                date: start,
                kind: AnomalyKind::TBreak,
                severity: Severity::Low,
                message: format!("{}-day break starting {}", longest_gap, start),
                z_score: None,
            });
        }
    }

    anomalies.truncate(MAX_ANOMALIES);
    anomalies
}
