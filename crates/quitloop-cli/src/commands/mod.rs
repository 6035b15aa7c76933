pub mod config;
pub mod flow;
pub mod log;
pub mod waitlist;

use quitloop_core::{Config, Database, KvEventLog};

/// Open the configured urge log.
pub fn open_log(config: &Config) -> Result<KvEventLog<Database>, Box<dyn std::error::Error>> {
    let db = Database::open_at(config.database_path()?)?;
    Ok(KvEventLog::new(db)
        .with_key(config.storage.log_key.clone())
        .with_write_retries(config.storage.write_retries))
}
