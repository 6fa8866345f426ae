//! Optional per-side game clock.
//!
//! The clock only runs while the session is active. Time is debited from the
//! running side when it stops or hands over; the side whose time reaches zero
//! loses on time.

use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Remaining time per side, as sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    /// First mover's remaining time in milliseconds.
    pub first_mover_ms: u64,
    /// Second mover's remaining time in milliseconds.
    pub second_mover_ms: u64,
    /// Side whose time is running, if any.
    pub running: Option<Role>,
}

/// Two-sided countdown clock.
#[derive(Debug, Clone)]
pub struct GameClock {
    budget: Duration,
    remaining: [Duration; 2],
    running: Option<(Role, Instant)>,
}

impl GameClock {
    /// Clock giving each side `budget`.
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            remaining: [budget; 2],
            running: None,
        }
    }

    /// Side whose time is running.
    pub fn running(&self) -> Option<Role> {
        self.running.map(|(role, _)| role)
    }

    /// Starts `role`'s time unless the clock is already running.
    #[instrument(skip(self, now))]
    pub fn start(&mut self, role: Role, now: Instant) {
        if self.running.is_none() {
            debug!("Clock started");
            self.running = Some((role, now));
        }
    }

    /// Stops the clock, debiting the running side.
    pub fn stop(&mut self, now: Instant) {
        if let Some((role, since)) = self.running.take() {
            let spent = now.saturating_duration_since(since);
            let slot = &mut self.remaining[role.index()];
            *slot = slot.saturating_sub(spent);
            debug!(%role, remaining_ms = slot.as_millis() as u64, "Clock stopped");
        }
    }

    /// Hands the running clock over to `to`. Does nothing when stopped.
    pub fn switch(&mut self, to: Role, now: Instant) {
        if self.running.is_some() {
            self.stop(now);
            self.running = Some((to, now));
        }
    }

    /// Restores full time for both sides and stops the clock.
    pub fn reset(&mut self) {
        self.remaining = [self.budget; 2];
        self.running = None;
    }

    /// Time `role` has left at `now`.
    pub fn remaining(&self, role: Role, now: Instant) -> Duration {
        let banked = self.remaining[role.index()];
        match self.running {
            Some((running, since)) if running == role => {
                banked.saturating_sub(now.saturating_duration_since(since))
            }
            _ => banked,
        }
    }

    /// Instant the running side's time runs out. `None` when stopped, or
    /// when the deadline lies beyond what `Instant` can represent.
    pub fn deadline(&self) -> Option<Instant> {
        self.running
            .and_then(|(role, since)| since.checked_add(self.remaining[role.index()]))
    }

    /// The running side, if its time is exhausted at `now`.
    pub fn flagged(&self, now: Instant) -> Option<Role> {
        self.running()
            .filter(|role| self.remaining(*role, now).is_zero())
    }

    /// Snapshot for the wire.
    pub fn reading(&self, now: Instant) -> ClockReading {
        ClockReading {
            first_mover_ms: self.remaining(Role::FirstMover, now).as_millis() as u64,
            second_mover_ms: self.remaining(Role::SecondMover, now).as_millis() as u64,
            running: self.running(),
        }
    }
}
