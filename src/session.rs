//! The session: role bindings, game state and outboxes under one owner.
//!
//! A `Session` is only ever touched by its actor task (see `actor.rs`), which
//! processes one command at a time. That serialization is the critical
//! section: a submission is always judged against the state committed by the
//! previous one.

use crate::authority::AuthorityGate;
use crate::broadcast::Broadcaster;
use crate::clock::GameClock;
use crate::engine::RulesEngine;
use crate::error::Rejection;
use crate::protocol::{ServerEvent, StateSnapshot, StatusSummary};
use crate::registry::RoleRegistry;
use crate::store::{GameStore, MoveLogEntry};
use crate::types::{ParticipantId, Phase, TerminalReason};
use chess_duel_rules::MoveRequest;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of a move submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The move was applied as log entry `ply`.
    Accepted {
        /// Position in the move log.
        ply: u32,
    },
    /// The move was discarded; only the submitter was told.
    Rejected(Rejection),
}

/// Tunables for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    /// Per-side clock budget; `None` disables the clock.
    pub clock: Option<Duration>,
}

/// One game session.
#[derive(Debug)]
pub struct Session<E> {
    pub(crate) registry: RoleRegistry,
    pub(crate) store: GameStore<E>,
    pub(crate) broadcaster: Broadcaster,
    pub(crate) clock: Option<GameClock>,
}

impl<E: RulesEngine> Session<E> {
    /// Fresh session: no roles bound, starting position.
    #[instrument(skip(engine))]
    pub fn new(engine: E, settings: SessionSettings) -> Self {
        info!(clock = ?settings.clock, "Creating game session");
        Self {
            registry: RoleRegistry::new(),
            store: GameStore::new(engine),
            broadcaster: Broadcaster::new(),
            clock: settings.clock.map(GameClock::new),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if self.store.is_terminal() {
            Phase::Terminal
        } else if self.registry.bound_roles() == 2 {
            Phase::Active
        } else {
            Phase::Forming
        }
    }

    /// Role bindings.
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Authoritative game state.
    pub fn store(&self) -> &GameStore<E> {
        &self.store
    }

    /// Accepted moves since the last reset.
    pub fn history(&self) -> Vec<MoveLogEntry> {
        self.store.log().to_vec()
    }

    /// Full state as sent to clients.
    pub fn snapshot(&self, now: Instant) -> StateSnapshot {
        let evaluation = self.store.evaluation();
        let terminal = self.store.terminal();
        StateSnapshot {
            position: self.store.position(),
            side_to_move: self.store.side_to_move(),
            in_check: evaluation.in_check,
            terminal: terminal.is_some(),
            reason: terminal.map(|t| t.reason).unwrap_or(TerminalReason::None),
            winner: terminal.and_then(|t| t.winner),
            moves: self.store.log().len() as u32,
            clock: self.clock.as_ref().map(|c| c.reading(now)),
        }
    }

    /// Status summary as sent to clients.
    pub fn status(&self, now: Instant) -> StatusSummary {
        let evaluation = self.store.evaluation();
        let terminal = self.store.terminal();
        StatusSummary {
            phase: self.phase(),
            side_to_move: self.store.side_to_move(),
            in_check: evaluation.in_check,
            terminal: terminal.is_some(),
            reason: terminal.map(|t| t.reason).unwrap_or(TerminalReason::None),
            winner: terminal.and_then(|t| t.winner),
            clock: self.clock.as_ref().map(|c| c.reading(now)),
        }
    }

    /// Handles a submitted action: gate, rules engine, commit, broadcast.
    ///
    /// Rejections go to the submitter alone and leave every piece of session
    /// state untouched.
    #[instrument(skip(self, action, now), fields(participant = %participant))]
    pub fn submit(
        &mut self,
        participant: ParticipantId,
        action: serde_json::Value,
        now: Instant,
    ) -> SubmitOutcome {
        let role = match AuthorityGate::authorize(&self.registry, &self.store, participant) {
            Ok(role) => role,
            Err(denial) => return self.reject(participant, action, denial.into()),
        };

        let request: MoveRequest = match serde_json::from_value(action.clone()) {
            Ok(request) => request,
            Err(e) => return self.reject(participant, action, Rejection::Malformed(e.to_string())),
        };

        let commit = match self.store.apply(role, &request) {
            Ok(commit) => commit,
            Err(e) => return self.reject(participant, action, e.into()),
        };

        if let Some(clock) = self.clock.as_mut() {
            clock.switch(self.store.side_to_move(), now);
        }
        self.sync_clock(now);

        let snapshot = self.snapshot(now);
        let status = self.status(now);
        self.broadcaster.announce_move(&commit, snapshot, status);

        debug!(ply = commit.entry.ply, "Submission accepted");
        SubmitOutcome::Accepted {
            ply: commit.entry.ply,
        }
    }

    /// Rejects a frame the transport could not parse as a client message.
    #[instrument(skip(self, payload), fields(participant = %participant))]
    pub fn reject_malformed(
        &mut self,
        participant: ParticipantId,
        payload: serde_json::Value,
        detail: String,
    ) -> SubmitOutcome {
        self.reject(participant, payload, Rejection::Malformed(detail))
    }

    fn reject(
        &self,
        participant: ParticipantId,
        action: serde_json::Value,
        rejection: Rejection,
    ) -> SubmitOutcome {
        warn!(%participant, reason = %rejection, "Submission rejected");
        self.broadcaster.send_to(
            participant,
            ServerEvent::MoveRejected {
                action,
                reason: rejection.to_string(),
            },
        );
        SubmitOutcome::Rejected(rejection)
    }

    /// Instant the running clock runs out, if a clock is running.
    pub fn clock_deadline(&self) -> Option<Instant> {
        self.clock.as_ref().and_then(GameClock::deadline)
    }

    /// Ends the game on time if the running side's clock is exhausted.
    /// Returns true when that happened.
    #[instrument(skip(self, now))]
    pub fn poll_clock(&mut self, now: Instant) -> bool {
        let Some(loser) = self.clock.as_ref().and_then(|c| c.flagged(now)) else {
            return false;
        };
        let Some(terminal) = self.store.declare_timeout(loser) else {
            return false;
        };
        self.sync_clock(now);

        let snapshot = self.snapshot(now);
        let status = self.status(now);
        self.broadcaster.announce_flag_fall(terminal, snapshot, status);
        true
    }

    /// Runs the clock exactly while the session is active.
    pub(crate) fn sync_clock(&mut self, now: Instant) {
        let active = self.phase() == Phase::Active;
        let side_to_move = self.store.side_to_move();
        if let Some(clock) = self.clock.as_mut() {
            match (active, clock.running()) {
                (true, None) => clock.start(side_to_move, now),
                (false, Some(_)) => clock.stop(now),
                _ => {}
            }
        }
    }
}
