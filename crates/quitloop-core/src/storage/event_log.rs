//! Append-only urge log kept under one key of a [`KeyValueStore`].
//!
//! The whole log is one JSON array. Appending reads it, pushes the new
//! entry and rewrites the array; there is no partial update. Two writers
//! on the same store are not coordinated and the last write wins.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::KeyValueStore;
use crate::error::StorageError;

/// Default key the log is stored under.
pub const DEFAULT_LOG_KEY: &str = "ql_events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Urge,
}

/// One completed flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Millisecond precision, `Z` suffix. Older logs used `at`.
    #[serde(alias = "at", serialize_with = "serialize_iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub intensity: Option<i32>,
    #[serde(default)]
    pub action: String,
}

impl EventLogEntry {
    pub fn urge(
        timestamp: DateTime<Utc>,
        intensity: Option<i32>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind: EntryKind::Urge,
            timestamp: timestamp.trunc_subsecs(3),
            intensity,
            action: action.into(),
        }
    }
}

fn serialize_iso_millis<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Log repository owned by the flow controller.
pub trait EventLog {
    /// Every stored entry, oldest first. Unreadable data reads as empty.
    fn read_all(&self) -> Vec<EventLogEntry>;

    /// Append one entry by rewriting the whole sequence.
    fn append_one(&mut self, entry: EventLogEntry) -> Result<(), StorageError>;
}

/// [`EventLog`] on top of any key-value store.
#[derive(Debug)]
pub struct KvEventLog<S> {
    store: S,
    key: String,
    write_retries: u32,
}

impl<S: KeyValueStore> KvEventLog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: DEFAULT_LOG_KEY.to_string(),
            write_retries: 1,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Extra write attempts after a failed one.
    pub fn with_write_retries(mut self, retries: u32) -> Self {
        self.write_retries = retries;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn write_all(&self, entries: &[EventLogEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        let attempts = self.write_retries.saturating_add(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match self.store.set(&self.key, &json) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(key = %self.key, attempt, attempts, error = %e, "event log write failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| StorageError::WriteFailed {
            key: self.key.clone(),
            message: "no write attempted".into(),
        }))
    }
}

impl<S: KeyValueStore> EventLog for KvEventLog<S> {
    fn read_all(&self) -> Vec<EventLogEntry> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "event log unreadable, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<EventLogEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "event log corrupted, treating as empty");
                Vec::new()
            }
        }
    }

    fn append_one(&mut self, entry: EventLogEntry) -> Result<(), StorageError> {
        let mut entries = self.read_all();
        entries.push(entry);
        self.write_all(&entries)?;
        tracing::info!(key = %self.key, len = entries.len(), "event log entry appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn entry(intensity: Option<i32>, action: &str) -> EventLogEntry {
        EventLogEntry::urge(Utc::now(), intensity, action)
    }

    #[test]
    fn missing_key_reads_empty() {
        let log = KvEventLog::new(MemoryStore::new());
        assert_eq!(log.key(), DEFAULT_LOG_KEY);
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn custom_key_leaves_default_untouched() {
        let mut log = KvEventLog::new(MemoryStore::new()).with_key("other_events");
        assert_eq!(log.key(), "other_events");
        log.append_one(entry(Some(2), "stretch")).unwrap();
        assert!(log.store().get(DEFAULT_LOG_KEY).unwrap().is_none());
    }

    #[test]
    fn append_preserves_order() {
        let mut log = KvEventLog::new(MemoryStore::new());
        log.append_one(entry(Some(3), "stretch")).unwrap();
        log.append_one(entry(None, "cold water")).unwrap();
        let all = log.read_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].action, "stretch");
        assert_eq!(all[1].intensity, None);
    }

    #[test]
    fn corrupted_log_is_replaced_on_append() {
        let store = MemoryStore::new();
        store.set(DEFAULT_LOG_KEY, "{not json").unwrap();
        let mut log = KvEventLog::new(store);
        assert!(log.read_all().is_empty());

        log.append_one(entry(Some(5), "2-min walk")).unwrap();
        let all = log.read_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].action, "2-min walk");
    }

    #[test]
    fn wire_format_matches_browser_log() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let e = EventLogEntry::urge(at, Some(7), "cold water");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "urge",
                "timestamp": "2026-10-19T08:30:00.000Z",
                "intensity": 7,
                "action": "cold water"
            })
        );
    }

    #[test]
    fn null_intensity_serializes_as_null() {
        let e = entry(None, "stretch");
        let json = serde_json::to_value(&e).unwrap();
        assert!(json["intensity"].is_null());
    }

    #[test]
    fn legacy_at_field_is_accepted() {
        let raw = r#"[{"type":"urge","at":"2025-01-02T03:04:05.678Z","intensity":4,"action":"stretch"}]"#;
        let store = MemoryStore::new();
        store.set("legacy", raw).unwrap();
        let log = KvEventLog::new(store).with_key("legacy");
        let all = log.read_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].intensity, Some(4));
        assert_eq!(
            all[0].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
                + chrono::Duration::milliseconds(678)
        );
    }

    struct FlakyStore {
        inner: MemoryStore,
        failures_left: Cell<u32>,
        set_calls: Cell<u32>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.set_calls.set(self.set_calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(StorageError::WriteFailed {
                    key: key.into(),
                    message: "quota exceeded".into(),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn flaky(failures: u32) -> FlakyStore {
        FlakyStore {
            inner: MemoryStore::new(),
            failures_left: Cell::new(failures),
            set_calls: Cell::new(0),
        }
    }

    #[test]
    fn single_failure_is_retried() {
        let mut log = KvEventLog::new(flaky(1));
        log.append_one(entry(Some(2), "stretch")).unwrap();
        assert_eq!(log.store().set_calls.get(), 2);
        assert_eq!(log.read_all().len(), 1);
    }

    #[test]
    fn persistent_failure_surfaces_after_retries() {
        let mut log = KvEventLog::new(flaky(10)).with_write_retries(2);
        let err = log.append_one(entry(Some(2), "stretch")).unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
        assert_eq!(log.store().set_calls.get(), 3);
        assert!(log.read_all().is_empty());
    }
}
