//! Integration tests for the SQLite-backed urge log.

use chrono::{Duration, Utc};
use quitloop_core::{Database, EventLog, EventLogEntry, KeyValueStore, KvEventLog, LogSummary};

#[test]
fn log_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quitloop.db");
    let base = Utc::now();

    {
        let mut log = KvEventLog::new(Database::open_at(&path).unwrap());
        log.append_one(EventLogEntry::urge(base, Some(6), "stretch")).unwrap();
    }
    {
        let mut log = KvEventLog::new(Database::open_at(&path).unwrap());
        log.append_one(EventLogEntry::urge(base + Duration::seconds(1), None, "cold water"))
            .unwrap();
    }

    let log = KvEventLog::new(Database::open_at(&path).unwrap());
    let entries = log.read_all();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "stretch");
    assert_eq!(entries[1].intensity, None);

    let summary = LogSummary::from_entries(&entries);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.average_intensity, Some(6.0));
}

#[test]
fn stored_value_is_a_plain_json_array() {
    let db = Database::open_memory().unwrap();
    let mut log = KvEventLog::new(&db).with_key("ql_events");
    log.append_one(EventLogEntry::urge(Utc::now(), Some(1), "stretch")).unwrap();

    let raw = db.get("ql_events").unwrap().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["type"], "urge");
    assert_eq!(arr[0]["intensity"], 1);
    assert!(arr[0]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn corrupted_database_value_is_overwritten() {
    let db = Database::open_memory().unwrap();
    db.set("ql_events", r#"{"type":"urge"}"#).unwrap();

    let mut log = KvEventLog::new(&db);
    assert!(log.read_all().is_empty());
    log.append_one(EventLogEntry::urge(Utc::now(), Some(3), "2-min walk")).unwrap();
    assert_eq!(log.read_all().len(), 1);
}

#[test]
fn separate_keys_do_not_interfere() {
    let db = Database::open_memory().unwrap();
    let mut a = KvEventLog::new(&db).with_key("a");
    let mut b = KvEventLog::new(&db).with_key("b");
    a.append_one(EventLogEntry::urge(Utc::now(), None, "stretch")).unwrap();
    b.append_one(EventLogEntry::urge(Utc::now(), None, "stretch")).unwrap();
    b.append_one(EventLogEntry::urge(Utc::now(), None, "stretch")).unwrap();
    assert_eq!(a.read_all().len(), 1);
    assert_eq!(b.read_all().len(), 2);
}
