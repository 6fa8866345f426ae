//! Resetting the game to its starting position.

use crate::engine::RulesEngine;
use crate::error::Denial;
use crate::session::Session;
use crate::types::ParticipantId;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

/// Outcome of a reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The game was reinitialized.
    Accepted,
    /// The requester holds no role.
    Denied(Denial),
}

impl<E: RulesEngine> Session<E> {
    /// Restores the starting position, clears the terminal flag and move
    /// log, and broadcasts game-reset followed by a fresh snapshot.
    ///
    /// Only role holders may reset. Role bindings survive the reset.
    #[instrument(skip(self, now), fields(participant = %participant))]
    pub fn request_reset(&mut self, participant: ParticipantId, now: Instant) -> ResetOutcome {
        let Some(role) = self.registry.role_of(participant) else {
            warn!("Reset requested by participant without a role");
            return ResetOutcome::Denied(Denial::NotAParticipant);
        };

        self.store.reset();
        if let Some(clock) = self.clock.as_mut() {
            clock.reset();
        }
        self.sync_clock(now);

        self.broadcaster.announce_reset(self.snapshot(now));
        info!(%role, phase = %self.phase(), "Game reset");
        ResetOutcome::Accepted
    }
}
