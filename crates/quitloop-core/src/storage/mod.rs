mod config;
pub mod database;
pub mod event_log;
mod memory;

pub use config::{Config, FlowConfig, StorageConfig, WaitlistConfig};
pub use database::Database;
pub use event_log::{EntryKind, EventLog, EventLogEntry, KvEventLog, DEFAULT_LOG_KEY};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Durable string key-value primitive the event log is written through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns the QuitLoop data directory, creating it if needed.
///
/// `QUITLOOP_HOME` wins when set. Otherwise `~/.config/quitloop`, or
/// `~/.config/quitloop-dev` with `QUITLOOP_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("QUITLOOP_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("QUITLOOP_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("quitloop-dev")
            } else {
                base_dir.join("quitloop")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
