use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::{Step, Trigger};
use crate::storage::EventLogEntry;

/// Why the flow moved to another step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// The user asked for it.
    Manual,
    /// The step's countdown ran out.
    Expired,
}

/// Every state change of the flow produces an Event.
/// The presentation layer renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    StepAdvanced {
        from: Step,
        to: Step,
        trigger: Trigger,
        cause: TransitionCause,
        duration_secs: Option<u32>,
        at: DateTime<Utc>,
    },
    IntensitySet {
        intensity: i32,
        at: DateTime<Utc>,
    },
    ActionChosen {
        action: String,
        at: DateTime<Utc>,
    },
    /// `saved` is false when the log write failed; the flow still completes.
    SessionFinished {
        entry: EventLogEntry,
        saved: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        at: DateTime<Utc>,
    },
    FlowReset {
        from: Step,
        at: DateTime<Utc>,
    },
    FlowTornDown {
        step: Step,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        step: Step,
        prompt: String,
        remaining_secs: Option<u32>,
        intensity: Option<i32>,
        action: String,
        intention_confirmed: bool,
        at: DateTime<Utc>,
    },
}
