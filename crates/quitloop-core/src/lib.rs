//! # QuitLoop Core Library
//!
//! Core logic for the QuitLoop urge intervention flow: a short guided
//! sequence of coaching steps, some self-paced and some on a countdown,
//! that ends by appending one record to a local log.
//!
//! ## Architecture
//!
//! - **Flow Controller**: an explicit state machine with one per-step
//!   countdown. It has no internal thread; the caller invokes `tick()`
//!   once per second.
//! - **Event log**: an append-only JSON array kept under a single key of a
//!   durable key-value store (SQLite by default).
//! - **Config**: TOML configuration in the data directory.
//! - **Waitlist**: a small HTTP client for the sign-up endpoint, unrelated
//!   to the flow.
//!
//! ## Key Components
//!
//! - [`FlowController`]: urge flow state machine
//! - [`EventLog`] / [`KvEventLog`]: log repository
//! - [`Database`]: SQLite key-value store
//! - [`Config`]: application configuration

pub mod error;
pub mod events;
pub mod flow;
pub mod history;
pub mod storage;
pub mod waitlist;

pub use error::{ConfigError, CoreError, StorageError, ValidationError, WaitlistError};
pub use events::{Event, TransitionCause};
pub use flow::{Countdown, CountdownTick, CountdownToken, FlowController, Session, Step, Trigger};
pub use history::LogSummary;
pub use storage::{
    Config, Database, EventLog, EventLogEntry, KeyValueStore, KvEventLog, MemoryStore,
};
pub use waitlist::{WaitlistClient, WaitlistOutcome};
