//! Medal catalog: static threshold tables, grouped by category.
//!
//! The catalog is plain immutable data injected into
//! [`crate::achievements::AchievementEngine`] at construction, never a
//! module-level singleton, so tests and config can substitute alternate
//! threshold sets.

use serde::Serialize;

/// Statistic a medal category or progress badge is keyed on.
///
/// Typed accessor dispatch instead of stringly-typed field lookup; see
/// [`crate::achievements::StatsSnapshot::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    TotalSessions,
    CurrentStreak,
    DailyRecord,
    UniqueStrains,
    TotalSpending,
    EarlyBirdSessions,
    NightOwlSessions,
    WeekendSessions,
    SpeedSessions,
}

impl StatKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKey::TotalSessions => "total_sessions",
            StatKey::CurrentStreak => "current_streak",
            StatKey::DailyRecord => "daily_record",
            StatKey::UniqueStrains => "unique_strains",
            StatKey::TotalSpending => "total_spending",
            StatKey::EarlyBirdSessions => "early_bird_sessions",
            StatKey::NightOwlSessions => "night_owl_sessions",
            StatKey::WeekendSessions => "weekend_sessions",
            StatKey::SpeedSessions => "speed_sessions",
        }
    }
}

/// Medal category. Declaration order here is the order medals are returned
/// in; thresholds within a category ascend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MedalCategory {
    Sessions,
    Streak,
    DailyRecord,
    Strains,
    Spending,
    EarlyBird,
    NightOwl,
    Weekend,
    Speed,
}

/// All categories in declaration order.
pub const CATEGORIES: &[MedalCategory] = &[
    MedalCategory::Sessions,
    MedalCategory::Streak,
    MedalCategory::DailyRecord,
    MedalCategory::Strains,
    MedalCategory::Spending,
    MedalCategory::EarlyBird,
    MedalCategory::NightOwl,
    MedalCategory::Weekend,
    MedalCategory::Speed,
];

impl MedalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedalCategory::Sessions => "sessions",
            MedalCategory::Streak => "streak",
            MedalCategory::DailyRecord => "daily_record",
            MedalCategory::Strains => "strains",
            MedalCategory::Spending => "spending",
            MedalCategory::EarlyBird => "early_bird",
            MedalCategory::NightOwl => "night_owl",
            MedalCategory::Weekend => "weekend",
            MedalCategory::Speed => "speed",
        }
    }

    /// All category identifiers, for config validation messages.
    pub fn known_names() -> Vec<&'static str> {
        CATEGORIES.iter().map(|c| c.as_str()).collect()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MedalCategory::Sessions => "Sessions",
            MedalCategory::Streak => "Streaks",
            MedalCategory::DailyRecord => "Daily Record",
            MedalCategory::Strains => "Strain Explorer",
            MedalCategory::Spending => "Big Spender",
            MedalCategory::EarlyBird => "Early Bird",
            MedalCategory::NightOwl => "Night Owl",
            MedalCategory::Weekend => "Weekend Warrior",
            MedalCategory::Speed => "Quick Draw",
        }
    }

    /// Which statistic this category's thresholds compare against.
    pub fn stat_key(&self) -> StatKey {
        match self {
            MedalCategory::Sessions => StatKey::TotalSessions,
            MedalCategory::Streak => StatKey::CurrentStreak,
            MedalCategory::DailyRecord => StatKey::DailyRecord,
            MedalCategory::Strains => StatKey::UniqueStrains,
            MedalCategory::Spending => StatKey::TotalSpending,
            MedalCategory::EarlyBird => StatKey::EarlyBirdSessions,
            MedalCategory::NightOwl => StatKey::NightOwlSessions,
            MedalCategory::Weekend => StatKey::WeekendSessions,
            MedalCategory::Speed => StatKey::SpeedSessions,
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            MedalCategory::Sessions => "🏆",
            MedalCategory::Streak => "🔥",
            MedalCategory::DailyRecord => "📈",
            MedalCategory::Strains => "🌿",
            MedalCategory::Spending => "💰",
            MedalCategory::EarlyBird => "🐦",
            MedalCategory::NightOwl => "🦉",
            MedalCategory::Weekend => "🎉",
            MedalCategory::Speed => "⚡",
        }
    }

    fn default_thresholds(&self) -> &'static [f64] {
        match self {
            MedalCategory::Sessions => &[1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0],
            MedalCategory::Streak => &[3.0, 7.0, 14.0, 30.0, 60.0, 100.0],
            MedalCategory::DailyRecord => &[5.0, 10.0, 15.0, 20.0],
            MedalCategory::Strains => &[3.0, 5.0, 10.0, 20.0],
            MedalCategory::Spending => &[50.0, 100.0, 250.0, 500.0, 1000.0],
            MedalCategory::EarlyBird => &[10.0, 25.0, 50.0],
            MedalCategory::NightOwl => &[10.0, 25.0, 50.0],
            MedalCategory::Weekend => &[20.0, 50.0, 100.0],
            MedalCategory::Speed => &[10.0, 25.0],
        }
    }

    fn describe(&self, threshold: f64) -> String {
        let value = if threshold.fract() == 0.0 {
            format!("{}", threshold as i64)
        } else {
            format!("{}", threshold)
        };
        match self {
            MedalCategory::Sessions => format!("Record {} sessions", value),
            MedalCategory::Streak => format!("Stay active {} days in a row", value),
            MedalCategory::DailyRecord => format!("Record {} hits in a single day", value),
            MedalCategory::Strains => format!("Try {} different strains", value),
            MedalCategory::Spending => format!("Spend {} total (by current settings)", value),
            MedalCategory::EarlyBird => format!("Record {} sessions before 9am", value),
            MedalCategory::NightOwl => format!("Record {} late-night sessions", value),
            MedalCategory::Weekend => format!("Record {} weekend sessions", value),
            MedalCategory::Speed => format!("Record {} sub-10-second sessions", value),
        }
    }

    fn medal_name(&self, index: usize) -> String {
        const TIERS: &[&str] = &[
            "Bronze", "Silver", "Gold", "Platinum", "Diamond", "Master", "Legend",
        ];
        let tier = TIERS.get(index).copied().unwrap_or("Legend");
        format!("{} {}", tier, self.display_name())
    }
}

impl std::str::FromStr for MedalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATEGORIES
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown medal category: {}", s))
    }
}

/// One medal definition: a display shell around a numeric trigger value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedalDef {
    pub threshold: f64,
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// Immutable, ordered medal configuration.
///
/// Categories keep their declaration order; thresholds within a category
/// are sorted ascending at construction.
#[derive(Debug, Clone)]
pub struct MedalCatalog {
    categories: Vec<(MedalCategory, Vec<MedalDef>)>,
}

impl MedalCatalog {
    /// Catalog with the built-in threshold tables.
    pub fn with_defaults() -> Self {
        let categories = CATEGORIES
            .iter()
            .map(|&cat| (cat, Self::build_defs(cat, cat.default_thresholds())))
            .collect();
        Self { categories }
    }

    /// Catalog with per-category threshold overrides; categories not in
    /// `overrides` keep their defaults. Display strings are regenerated
    /// from the category templates.
    pub fn with_overrides(overrides: &[(MedalCategory, Vec<f64>)]) -> Self {
        let categories = CATEGORIES
            .iter()
            .map(|&cat| {
                let thresholds: Vec<f64> = overrides
                    .iter()
                    .find(|(c, _)| *c == cat)
                    .map(|(_, t)| t.clone())
                    .unwrap_or_else(|| cat.default_thresholds().to_vec());
                (cat, Self::build_defs(cat, &thresholds))
            })
            .collect();
        Self { categories }
    }

    fn build_defs(category: MedalCategory, thresholds: &[f64]) -> Vec<MedalDef> {
        let mut sorted: Vec<f64> = thresholds
            .iter()
            .copied()
            .filter(|t| t.is_finite() && *t > 0.0)
            .collect();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, threshold)| MedalDef {
                threshold,
                name: category.medal_name(i),
                icon: category.icon().to_string(),
                description: category.describe(threshold),
            })
            .collect()
    }

    /// Categories with their ascending medal definitions, declaration order.
    pub fn categories(&self) -> &[(MedalCategory, Vec<MedalDef>)] {
        &self.categories
    }

    /// Total number of medals that can possibly be earned.
    pub fn total_medals(&self) -> usize {
        self.categories.iter().map(|(_, defs)| defs.len()).sum()
    }

    /// Threshold list for one category.
    pub fn thresholds(&self, category: MedalCategory) -> Vec<f64> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, defs)| defs.iter().map(|d| d.threshold).collect())
            .unwrap_or_default()
    }
}

impl Default for MedalCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
