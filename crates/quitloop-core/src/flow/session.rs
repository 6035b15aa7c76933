use serde::{Deserialize, Serialize};

use super::step::Step;

/// User-entered state for one run of the flow.
///
/// Remaining countdown seconds live on the controller's countdown, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub current_step: Step,
    /// Stored as given; the 0-10 range is a presentation concern.
    pub intensity: Option<i32>,
    /// Empty means no action chosen yet.
    pub chosen_action: String,
    pub intention_confirmed: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_action(&self) -> bool {
        !self.chosen_action.trim().is_empty()
    }
}
