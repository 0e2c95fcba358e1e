//! # highscore-core
//!
//! Derived-data engine for HighScore - a personal consumption tracker.
//!
//! This library provides:
//! - Domain types for hits, day aggregates, settings, and goals
//! - History aggregation (the canonical day-bucketed view of the hit log)
//! - Streak/break arithmetic, DST-safe
//! - Trend forecasting and anomaly detection
//! - Tolerance and habit scoring with recommendations
//! - A threshold-based achievement/medal engine with progress tracking
//! - The backup-document boundary for restore/export
//!
//! ## Architecture
//!
//! Everything derives from a single append-only hit log:
//!
//! ```text
//! hits ──► history ──► aggregates ──┬─► streaks
//!   │                               ├─► trends
//!   │                               ├─► habits
//!   └───────────────────────────────┴─► achievements
//! ```
//!
//! All engines are pure, synchronous functions of an in-memory snapshot:
//! no I/O, no ambient clock reads ("now" and "today" are parameters), and
//! no state between invocations. IO lives only at the config, logging, and
//! backup edges.
//!
//! ## Example
//!
//! ```rust
//! use highscore_core::{achievements, history, streaks, types::Settings};
//!
//! let hits = vec![];
//! let aggregates = history::rebuild_history_from_hits(&hits);
//! let today = chrono::Local::now().date_naive();
//! let stats =
//!     achievements::compute_stats_snapshot(&hits, &aggregates, &Settings::default(), today);
//! let engine = achievements::AchievementEngine::with_defaults();
//! assert!(engine.generate_medals(&stats).is_empty());
//! assert_eq!(streaks::current_streak(&aggregates, today), 0);
//! ```

// Re-export commonly used items at the crate root
pub use achievements::{AchievementEngine, MedalCatalog, StatsSnapshot};
pub use backup::{BackupDocument, Snapshot};
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod achievements;
pub mod backup;
pub mod calendar;
pub mod config;
pub mod error;
pub mod habits;
pub mod history;
pub mod logging;
pub mod streaks;
pub mod trends;
pub mod types;
