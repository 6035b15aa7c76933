//! TOML-based application configuration.
//!
//! Stores:
//! - where and how the urge log is persisted
//! - the tick cadence used by the CLI driver
//! - the waitlist endpoint
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use super::database::DEFAULT_DATABASE_FILE;
use super::event_log::DEFAULT_LOG_KEY;
use crate::error::{ConfigError, CoreError};

/// Event log persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_log_key")]
    pub log_key: String,
    #[serde(default = "default_database_file")]
    pub database_file: String,
    /// Extra write attempts after a failed log write.
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,
}

/// Flow driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Milliseconds between countdown ticks. One tick is one flow second.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Waitlist client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub waitlist: WaitlistConfig,
}

fn default_log_key() -> String {
    DEFAULT_LOG_KEY.into()
}
fn default_database_file() -> String {
    DEFAULT_DATABASE_FILE.into()
}
fn default_write_retries() -> u32 {
    1
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_endpoint() -> String {
    "http://localhost:3000/api/waitlist".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_key: default_log_key(),
            database_file: default_database_file(),
            write_retries: default_write_retries(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for WaitlistConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot replace a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults when no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every leaf setting as a `section.key` pair, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let Ok(serde_json::Value::Object(sections)) = serde_json::to_value(self) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (section, fields) in &sections {
            let Some(fields) = fields.as_object() else {
                continue;
            };
            for (name, value) in fields {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.push((format!("{section}.{name}"), value));
            }
        }
        out
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit
    /// the field's type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Database file path inside the data directory.
    pub fn database_path(&self) -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join(&self.storage.database_file))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.storage.log_key, "ql_events");
        assert_eq!(parsed.flow.tick_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[storage]\nwrite_retries = 3\n").unwrap();
        assert_eq!(parsed.storage.write_retries, 3);
        assert_eq!(parsed.storage.log_key, "ql_events");
        assert_eq!(parsed.waitlist.timeout_secs, 10);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("storage.log_key").as_deref(), Some("ql_events"));
        assert_eq!(cfg.get("flow.tick_ms").as_deref(), Some("1000"));
        assert!(cfg.get("storage.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn entries_cover_every_setting() {
        let entries = Config::default().entries();
        assert_eq!(entries.len(), 6);
        let cfg = Config::default();
        for (key, value) in &entries {
            assert_eq!(cfg.get(key).as_ref(), Some(value), "{key}");
        }
        assert!(entries
            .iter()
            .any(|(k, v)| k == "waitlist.timeout_secs" && v == "10"));
    }

    #[test]
    fn apply_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.apply("storage.write_retries", "0").unwrap();
        cfg.apply("waitlist.endpoint", "https://quitloop.app/api/waitlist")
            .unwrap();
        assert_eq!(cfg.storage.write_retries, 0);
        assert_eq!(cfg.waitlist.endpoint, "https://quitloop.app/api/waitlist");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("storage.nonexistent", "1").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_number() {
        let mut cfg = Config::default();
        let err = cfg.apply("flow.tick_ms", "fast").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.flow.tick_ms, 1000);
    }

    #[test]
    fn apply_rejects_section_replacement() {
        let mut cfg = Config::default();
        assert!(cfg.apply("storage", "{}").is_err());
    }
}
