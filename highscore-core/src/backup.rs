//! Persisted-state boundary: the backup document the host reads and writes.
//!
//! The document shape is `{version, settings, historyData, sessionHits,
//! goals}`. Everything in it is untrusted on load: each hit decodes
//! independently so one corrupt entry cannot sink the restore, and the
//! day-bucketed history is re-derived from the hits instead of trusting the
//! possibly-stale `historyData` field. Stored day notes are the one thing
//! the rebuild cannot reconstruct, so they are re-attached by date.

use crate::error::{Error, Result};
use crate::history::rebuild_history_from_hits_in;
use crate::types::{DayAggregate, Goals, Hit, Settings};
use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Current backup document version.
pub const BACKUP_VERSION: u32 = 1;

/// Stored per-day entry as written by older hosts; only the note is
/// trusted on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredDay {
    date: NaiveDate,
    #[serde(default)]
    count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

/// The raw backup document at the persistence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    pub version: u32,
    #[serde(default)]
    pub settings: Settings,
    /// Possibly stale; superseded by re-derivation on load
    #[serde(rename = "historyData", default)]
    history_data: Vec<StoredDay>,
    /// Each element decodes independently on load
    #[serde(rename = "sessionHits", default)]
    session_hits: Vec<serde_json::Value>,
    #[serde(default)]
    pub goals: Goals,
}

/// A validated in-memory snapshot restored from a backup document.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub settings: Settings,
    pub goals: Goals,
    pub hits: Vec<Hit>,
    /// Re-derived from `hits`, with stored notes re-attached
    pub aggregates: Vec<DayAggregate>,
    /// Hit entries that failed to decode and were dropped
    pub dropped_entries: u32,
}

impl Snapshot {
    /// Restore a snapshot from a backup document, re-deriving the history.
    pub fn from_backup_in<Tz: TimeZone>(tz: &Tz, doc: BackupDocument) -> Self {
        let mut hits = Vec::with_capacity(doc.session_hits.len());
        let mut dropped = 0u32;
        for value in doc.session_hits {
            match serde_json::from_value::<Hit>(value) {
                Ok(hit) => hits.push(hit),
                Err(e) => {
                    dropped += 1;
                    tracing::warn!(error = %e, "Dropped undecodable hit from backup");
                }
            }
        }

        let mut aggregates = rebuild_history_from_hits_in(tz, &hits);
        for agg in aggregates.iter_mut() {
            if let Some(stored) = doc.history_data.iter().find(|d| d.date == agg.date) {
                agg.note = stored.note.clone();
            }
        }

        tracing::info!(
            hits = hits.len(),
            days = aggregates.len(),
            dropped,
            "Restored snapshot from backup"
        );

        Snapshot {
            settings: doc.settings,
            goals: doc.goals,
            hits,
            aggregates,
            dropped_entries: dropped,
        }
    }

    /// [`Snapshot::from_backup_in`] bound to the host's local timezone.
    pub fn from_backup(doc: BackupDocument) -> Self {
        Self::from_backup_in(&Local, doc)
    }

    /// Parse and restore from raw JSON.
    pub fn from_json_in<Tz: TimeZone>(tz: &Tz, json: &str) -> Result<Self> {
        let doc: BackupDocument =
            serde_json::from_str(json).map_err(|e| Error::Backup {
                message: format!("invalid backup document: {e}"),
            })?;
        Ok(Self::from_backup_in(tz, doc))
    }

    /// Export this snapshot as a backup document.
    pub fn to_backup(&self) -> BackupDocument {
        BackupDocument {
            version: BACKUP_VERSION,
            settings: self.settings.clone(),
            history_data: self
                .aggregates
                .iter()
                .map(|agg| StoredDay {
                    date: agg.date,
                    count: agg.count,
                    note: agg.note.clone(),
                })
                .collect(),
            session_hits: self
                .hits
                .iter()
                .map(|h| serde_json::to_value(h).expect("hit serialization is infallible"))
                .collect(),
            goals: self.goals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    const DAY1: i64 = 1_741_478_400_000; // 2025-03-09 00:00:00 UTC

    #[test]
    fn test_restore_re_derives_history() {
        // historyData claims a stale count of 99; the rebuild wins
        let json = format!(
            r#"{{
                "version": 1,
                "settings": {{"bowlSize": 0.3, "weedRatio": 80.0}},
                "historyData": [
                    {{"date": "2025-03-09", "count": 99, "note": "heavy day"}}
                ],
                "sessionHits": [
                    {{"id": "1", "timestamp": {ts1}}},
                    {{"id": "2", "timestamp": {ts2}}}
                ],
                "goals": {{"dailyLimit": 5, "tBreakDays": 3}}
            }}"#,
            ts1 = DAY1 + 3_600_000,
            ts2 = DAY1 + 7_200_000,
        );
        let snapshot = Snapshot::from_json_in(&utc(), &json).unwrap();

        assert_eq!(snapshot.aggregates.len(), 1);
        assert_eq!(snapshot.aggregates[0].count, 2);
        // But the stored note survives
        assert_eq!(snapshot.aggregates[0].note.as_deref(), Some("heavy day"));
        assert_eq!(snapshot.goals.daily_limit, 5);
        assert_eq!(snapshot.dropped_entries, 0);
    }

    #[test]
    fn test_corrupt_hits_dropped_not_fatal() {
        let json = format!(
            r#"{{
                "version": 1,
                "sessionHits": [
                    {{"id": "1", "timestamp": {ts}}},
                    {{"bogus": true}},
                    "not even an object"
                ]
            }}"#,
            ts = DAY1,
        );
        let snapshot = Snapshot::from_json_in(&utc(), &json).unwrap();
        assert_eq!(snapshot.hits.len(), 1);
        assert_eq!(snapshot.dropped_entries, 2);
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        assert!(Snapshot::from_json_in(&utc(), "{ nope").is_err());
    }

    #[test]
    fn test_round_trip() {
        let json = format!(
            r#"{{
                "version": 1,
                "sessionHits": [{{"id": "1", "timestamp": {ts}, "strainName": "Haze"}}]
            }}"#,
            ts = DAY1,
        );
        let snapshot = Snapshot::from_json_in(&utc(), &json).unwrap();
        let doc = snapshot.to_backup();
        assert_eq!(doc.version, BACKUP_VERSION);

        let restored = Snapshot::from_backup_in(&utc(), doc);
        assert_eq!(restored.hits, snapshot.hits);
        assert_eq!(restored.aggregates, snapshot.aggregates);
    }

    #[test]
    fn test_empty_document() {
        let snapshot = Snapshot::from_json_in(&utc(), r#"{"version": 1}"#).unwrap();
        assert!(snapshot.hits.is_empty());
        assert!(snapshot.aggregates.is_empty());
        assert_eq!(snapshot.dropped_entries, 0);
    }
}
