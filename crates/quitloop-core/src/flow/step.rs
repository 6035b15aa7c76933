use serde::{Deserialize, Serialize};

/// One stage of the urge flow.
///
/// The declaration order is the flow order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Idle,
    Notice,
    Breathe,
    Label,
    Choose,
    Intention,
    Timer,
    Followup,
    Done,
}

/// What asked the state machine to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Start,
    /// Generic forward move, manual or fired by an expired countdown.
    Advance,
    ConfirmIntention,
    Finish,
}

/// Fixed metadata attached to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepSpec {
    pub step: Step,
    pub duration_secs: Option<u32>,
    pub prompt: &'static str,
}

impl Step {
    pub const ORDER: [Step; 9] = [
        Step::Idle,
        Step::Notice,
        Step::Breathe,
        Step::Label,
        Step::Choose,
        Step::Intention,
        Step::Timer,
        Step::Followup,
        Step::Done,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The following step in flow order, clamped at `Done`.
    pub fn next(self) -> Step {
        let i = (self.index() + 1).min(Self::ORDER.len() - 1);
        Self::ORDER[i]
    }

    pub fn duration_secs(self) -> Option<u32> {
        match self {
            Step::Notice => Some(10),
            Step::Breathe => Some(20),
            Step::Label => Some(15),
            Step::Timer => Some(120),
            _ => None,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Step::Idle => "A 60-second wave ride + one tiny action.",
            Step::Notice => "Where do you feel the urge? Name two sensations.",
            Step::Breathe => "Box breathe 4-4-4-4. Watch the wave rise and fall.",
            Step::Label => "Rate the urge 0–10.",
            Step::Choose => "Pick one tiny action for ~2 minutes.",
            Step::Intention => "Confirm your 2-minute plan.",
            Step::Timer => "Doing your tiny action…",
            Step::Followup => "How’s the urge now (0–10)? One thing that helped?",
            Step::Done => "Saved locally. Nice work.",
        }
    }

    pub fn spec(self) -> StepSpec {
        StepSpec {
            step: self,
            duration_secs: self.duration_secs(),
            prompt: self.prompt(),
        }
    }

    pub fn is_timed(self) -> bool {
        self.duration_secs().is_some()
    }

    pub fn is_terminal(self) -> bool {
        self == Step::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Idle => "idle",
            Step::Notice => "notice",
            Step::Breathe => "breathe",
            Step::Label => "label",
            Step::Choose => "choose",
            Step::Intention => "intention",
            Step::Timer => "timer",
            Step::Followup => "followup",
            Step::Done => "done",
        }
    }

    /// Transition table.
    ///
    /// Returns the destination for `trigger`, or `None` when the trigger is
    /// not legal from this step. Data guards (a chosen action before
    /// `intention`) are checked by the controller on top of this table.
    pub fn transition(self, trigger: Trigger) -> Option<Step> {
        use Step::*;
        use Trigger::*;
        match (self, trigger) {
            (Idle, Start | Advance) => Some(Notice),
            (Notice, Advance) => Some(Breathe),
            (Breathe, Advance) => Some(Label),
            (Label, Advance) => Some(Choose),
            (Choose, Advance) => Some(Intention),
            (Intention, ConfirmIntention) => Some(Timer),
            (Timer, Advance) => Some(Followup),
            (Followup, Finish) => Some(Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for every step, in flow order.
pub fn step_table() -> Vec<StepSpec> {
    Step::ORDER.iter().map(|s| s.spec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_declaration() {
        for (i, step) in Step::ORDER.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }

    #[test]
    fn next_clamps_at_done() {
        assert_eq!(Step::Followup.next(), Step::Done);
        assert_eq!(Step::Done.next(), Step::Done);
    }

    #[test]
    fn timed_steps_and_durations() {
        let timed: Vec<_> = Step::ORDER
            .iter()
            .filter_map(|s| s.duration_secs().map(|d| (*s, d)))
            .collect();
        assert_eq!(
            timed,
            vec![
                (Step::Notice, 10),
                (Step::Breathe, 20),
                (Step::Label, 15),
                (Step::Timer, 120),
            ]
        );
    }

    #[test]
    fn timer_only_reachable_by_confirmation() {
        assert_eq!(Step::Intention.transition(Trigger::Advance), None);
        assert_eq!(
            Step::Intention.transition(Trigger::ConfirmIntention),
            Some(Step::Timer)
        );
        for step in Step::ORDER {
            if step != Step::Intention {
                assert_ne!(step.transition(Trigger::Advance), Some(Step::Timer));
            }
        }
    }

    #[test]
    fn done_has_no_exits() {
        for trigger in [
            Trigger::Start,
            Trigger::Advance,
            Trigger::ConfirmIntention,
            Trigger::Finish,
        ] {
            assert_eq!(Step::Done.transition(trigger), None);
        }
    }

    #[test]
    fn every_legal_transition_moves_forward_by_one() {
        for step in Step::ORDER {
            for trigger in [
                Trigger::Start,
                Trigger::Advance,
                Trigger::ConfirmIntention,
                Trigger::Finish,
            ] {
                if let Some(to) = step.transition(trigger) {
                    assert_eq!(to, step.next());
                }
            }
        }
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Step::Followup).unwrap();
        assert_eq!(json, "\"followup\"");
        assert_eq!(Step::Followup.to_string(), "followup");
    }
}
