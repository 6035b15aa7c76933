//! Urge flow controller.
//!
//! A state machine over [`Step`] with one attached [`Countdown`]. Like the
//! countdown it has no thread: the caller feeds `tick()` once per second
//! and forwards user actions.
//!
//! ## Transitions
//!
//! ```text
//! idle -start-> notice -> breathe -> label -> choose -> intention
//!      -confirm-> timer -> followup -finish-> done
//! ```
//!
//! Timed steps (`notice`, `breathe`, `label`, `timer`) advance on their own
//! when the countdown expires. Triggers that are not legal from the
//! current step are absorbed and return `None`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut flow = FlowController::new(KvEventLog::new(Database::open()?));
//! flow.start();
//! // Once per second:
//! flow.tick(); // Some(Event::StepAdvanced { .. }) when a countdown expires
//! ```

use chrono::{DateTime, Utc};

use super::countdown::{Countdown, CountdownTick, CountdownToken};
use super::session::Session;
use super::step::{Step, Trigger};
use crate::events::{Event, TransitionCause};
use crate::storage::{EventLog, EventLogEntry};

#[derive(Debug)]
pub struct FlowController<L> {
    session: Session,
    countdown: Countdown,
    log: L,
    /// Set by `teardown`. A detached controller ignores every trigger.
    detached: bool,
}

impl<L: EventLog> FlowController<L> {
    pub fn new(log: L) -> Self {
        Self {
            session: Session::new(),
            countdown: Countdown::new(),
            log,
            detached: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn step(&self) -> Step {
        self.session.current_step
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Seconds left on the current step, `None` for untimed steps.
    pub fn remaining_secs(&self) -> Option<u32> {
        self.step()
            .is_timed()
            .then(|| self.countdown.remaining_secs())
    }

    pub fn intensity(&self) -> Option<i32> {
        self.session.intensity
    }

    pub fn chosen_action(&self) -> &str {
        &self.session.chosen_action
    }

    /// Token for the live countdown; pass it back to `tick_armed`.
    pub fn countdown_token(&self) -> Option<CountdownToken> {
        self.countdown.token()
    }

    /// Changes on every arm and cancel. Drivers watch it to realign their
    /// tick schedule after a step change.
    pub fn countdown_generation(&self) -> u64 {
        self.countdown.generation()
    }

    pub fn countdown_active(&self) -> bool {
        !self.detached && self.countdown.is_armed()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            step: self.step(),
            prompt: self.step().prompt().to_string(),
            remaining_secs: self.remaining_secs(),
            intensity: self.session.intensity,
            action: self.session.chosen_action.clone(),
            intention_confirmed: self.session.intention_confirmed,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.step() != Step::Idle {
            return self.absorb(Trigger::Start);
        }
        self.fire(Trigger::Start, TransitionCause::Manual)
    }

    /// Generic forward move. Never enters `timer` and never leaves
    /// `followup`; those need `confirm_intention` and `finish`.
    pub fn advance(&mut self) -> Option<Event> {
        self.fire(Trigger::Advance, TransitionCause::Manual)
    }

    /// One elapsed second for the live countdown.
    pub fn tick(&mut self) -> Option<Event> {
        if self.detached {
            return None;
        }
        let outcome = self.countdown.tick();
        self.on_tick(outcome)
    }

    /// One elapsed second, dropped if `token` is from an earlier arming.
    pub fn tick_armed(&mut self, token: CountdownToken) -> Option<Event> {
        if self.detached {
            return None;
        }
        let outcome = self.countdown.tick_for(token);
        self.on_tick(outcome)
    }

    pub fn set_intensity(&mut self, intensity: i32) -> Option<Event> {
        if self.detached || self.step() != Step::Label {
            tracing::debug!(step = %self.step(), "intensity ignored outside label");
            return None;
        }
        self.session.intensity = Some(intensity);
        Some(Event::IntensitySet {
            intensity,
            at: Utc::now(),
        })
    }

    pub fn set_action(&mut self, action: impl Into<String>) -> Option<Event> {
        let editable = matches!(self.step(), Step::Choose | Step::Intention)
            && !self.session.intention_confirmed;
        if self.detached || !editable {
            tracing::debug!(step = %self.step(), "action ignored");
            return None;
        }
        let action = action.into();
        self.session.chosen_action = action.clone();
        Some(Event::ActionChosen {
            action,
            at: Utc::now(),
        })
    }

    pub fn confirm_intention(&mut self) -> Option<Event> {
        let event = self.fire(Trigger::ConfirmIntention, TransitionCause::Manual)?;
        self.session.intention_confirmed = true;
        Some(event)
    }

    /// Record the session and complete the flow. Only legal in `followup`.
    pub fn finish(&mut self) -> Option<Event> {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(&mut self, at: DateTime<Utc>) -> Option<Event> {
        if self.detached || self.step() != Step::Followup {
            return self.absorb(Trigger::Finish);
        }

        let entry = EventLogEntry::urge(
            at,
            self.session.intensity,
            self.session.chosen_action.clone(),
        );
        let (saved, error) = match self.log.append_one(entry.clone()) {
            Ok(()) => (true, None),
            Err(e) => {
                tracing::warn!(error = %e, "urge session not saved");
                (false, Some(e.to_string()))
            }
        };

        self.enter(Step::Done);
        tracing::info!(saved, "urge flow finished");
        Some(Event::SessionFinished {
            entry,
            saved,
            error,
            at: Utc::now(),
        })
    }

    /// Drop the session and return to `idle`.
    pub fn reset(&mut self) -> Option<Event> {
        if self.detached {
            return None;
        }
        let from = self.step();
        self.countdown.cancel();
        self.session = Session::new();
        Some(Event::FlowReset {
            from,
            at: Utc::now(),
        })
    }

    /// Leave the flow. The countdown is cancelled for good.
    pub fn teardown(&mut self) -> Option<Event> {
        if self.detached {
            return None;
        }
        self.countdown.cancel();
        self.detached = true;
        tracing::debug!(step = %self.step(), "urge flow torn down");
        Some(Event::FlowTornDown {
            step: self.step(),
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_tick(&mut self, outcome: CountdownTick) -> Option<Event> {
        match outcome {
            CountdownTick::Idle => None,
            CountdownTick::Running { remaining_secs } => {
                tracing::trace!(step = %self.step(), remaining_secs, "tick");
                None
            }
            CountdownTick::Expired => self.fire(Trigger::Advance, TransitionCause::Expired),
        }
    }

    fn fire(&mut self, trigger: Trigger, cause: TransitionCause) -> Option<Event> {
        if self.detached {
            return None;
        }
        let from = self.step();
        let Some(to) = from.transition(trigger) else {
            return self.absorb(trigger);
        };
        if matches!(to, Step::Intention | Step::Timer) && !self.session.has_action() {
            tracing::debug!(from = %from, to = %to, "no action chosen yet");
            return None;
        }

        self.enter(to);
        tracing::info!(from = %from, to = %to, ?cause, "step advanced");
        Some(Event::StepAdvanced {
            from,
            to,
            trigger,
            cause,
            duration_secs: to.duration_secs(),
            at: Utc::now(),
        })
    }

    /// Single place the current step changes: cancel, move, maybe re-arm.
    fn enter(&mut self, to: Step) {
        self.countdown.cancel();
        self.session.current_step = to;
        if let Some(duration) = to.duration_secs() {
            self.countdown.arm(duration);
        }
    }

    fn absorb(&self, trigger: Trigger) -> Option<Event> {
        tracing::debug!(step = %self.step(), ?trigger, "trigger absorbed");
        None
    }
}
