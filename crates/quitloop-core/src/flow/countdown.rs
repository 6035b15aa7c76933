//! Per-step countdown.
//!
//! The countdown has no thread or timer of its own. The owner feeds it one
//! `tick()` per elapsed second and reacts to `CountdownTick::Expired`.
//! Every `arm` and `cancel` bumps a generation counter; a tick carrying a
//! token from an earlier generation is ignored, so a tick scheduled for a
//! step the user already left can never land on the next one.

use serde::{Deserialize, Serialize};

/// Identifies one arming of a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountdownToken(u64);

impl CountdownToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Nothing armed, or the tick belonged to an older arming.
    Idle,
    Running { remaining_secs: u32 },
    /// Reached zero on this tick. Reported once per arming.
    Expired,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining_secs: u32,
    armed: bool,
    generation: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `duration_secs`, replacing any live countdown.
    pub fn arm(&mut self, duration_secs: u32) -> CountdownToken {
        self.generation = self.generation.wrapping_add(1);
        self.remaining_secs = duration_secs;
        self.armed = true;
        CountdownToken(self.generation)
    }

    /// Stop the live countdown. Outstanding tokens become stale.
    pub fn cancel(&mut self) {
        if self.armed {
            self.generation = self.generation.wrapping_add(1);
        }
        self.armed = false;
        self.remaining_secs = 0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Token of the live arming, if any.
    pub fn token(&self) -> Option<CountdownToken> {
        self.armed.then_some(CountdownToken(self.generation))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// One elapsed second for whatever is armed.
    pub fn tick(&mut self) -> CountdownTick {
        if !self.armed {
            return CountdownTick::Idle;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.armed = false;
            return CountdownTick::Expired;
        }
        self.remaining_secs -= 1;
        CountdownTick::Running {
            remaining_secs: self.remaining_secs,
        }
    }

    /// One elapsed second, only if `token` is still the live arming.
    pub fn tick_for(&mut self, token: CountdownToken) -> CountdownTick {
        if self.token() != Some(token) {
            return CountdownTick::Idle;
        }
        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_exactly_duration_ticks() {
        let mut c = Countdown::new();
        c.arm(3);
        assert_eq!(c.tick(), CountdownTick::Running { remaining_secs: 2 });
        assert_eq!(c.tick(), CountdownTick::Running { remaining_secs: 1 });
        assert_eq!(c.tick(), CountdownTick::Expired);
        assert_eq!(c.remaining_secs(), 0);
        assert!(!c.is_armed());
        // Expiry is reported once.
        assert_eq!(c.tick(), CountdownTick::Idle);
    }

    #[test]
    fn cancel_stops_decrement() {
        let mut c = Countdown::new();
        c.arm(10);
        c.tick();
        c.cancel();
        assert_eq!(c.tick(), CountdownTick::Idle);
        assert_eq!(c.remaining_secs(), 0);
    }

    #[test]
    fn stale_token_is_ignored() {
        let mut c = Countdown::new();
        let first = c.arm(10);
        let second = c.arm(20);
        assert_ne!(first, second);
        assert_eq!(c.tick_for(first), CountdownTick::Idle);
        assert_eq!(c.remaining_secs(), 20);
        assert_eq!(
            c.tick_for(second),
            CountdownTick::Running { remaining_secs: 19 }
        );
    }

    #[test]
    fn token_invalidated_by_cancel() {
        let mut c = Countdown::new();
        let token = c.arm(5);
        c.cancel();
        c.arm(5);
        assert_eq!(c.tick_for(token), CountdownTick::Idle);
        assert_eq!(c.remaining_secs(), 5);
    }

    #[test]
    fn zero_duration_expires_on_first_tick() {
        let mut c = Countdown::new();
        c.arm(0);
        assert_eq!(c.tick(), CountdownTick::Expired);
    }
}
