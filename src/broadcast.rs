//! Fan-out of server events to connections.
//!
//! Each connection owns an unbounded outbox drained by its transport task.
//! Queuing never blocks, so a stalled connection cannot hold up the session.
//! Events for one connection arrive in the order they were queued.

use crate::protocol::{ServerEvent, StateSnapshot, StatusSummary};
use crate::store::Commit;
use crate::types::{ParticipantId, Terminal};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Sending half of a connection's event queue.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Outboxes of every connected participant.
#[derive(Debug, Default)]
pub struct Broadcaster {
    outboxes: BTreeMap<ParticipantId, Outbox>,
}

impl Broadcaster {
    /// Broadcaster with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection.
    pub fn register(&mut self, participant: ParticipantId, outbox: Outbox) {
        self.outboxes.insert(participant, outbox);
    }

    /// Drops a connection's outbox, which ends its transport writer.
    pub fn remove(&mut self, participant: ParticipantId) {
        self.outboxes.remove(&participant);
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    /// True when nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }

    /// Queues an event for one connection.
    #[instrument(skip(self, event), fields(event = event.name()))]
    pub fn send_to(&self, participant: ParticipantId, event: ServerEvent) {
        match self.outboxes.get(&participant) {
            Some(outbox) => {
                if outbox.send(event).is_err() {
                    debug!("Outbox closed, connection is going away");
                }
            }
            None => debug!("No outbox for participant"),
        }
    }

    /// Queues an event for every connection.
    #[instrument(
        skip(self, event),
        fields(event = event.name(), connections = self.outboxes.len())
    )]
    pub fn broadcast(&self, event: ServerEvent) {
        for (participant, outbox) in &self.outboxes {
            if outbox.send(event.clone()).is_err() {
                debug!(%participant, "Outbox closed, connection is going away");
            }
        }
    }

    /// Announces an accepted move: move-applied, state-snapshot, game-status,
    /// then game-over if the move ended the game.
    pub fn announce_move(&self, commit: &Commit, snapshot: StateSnapshot, status: StatusSummary) {
        self.broadcast(ServerEvent::MoveApplied {
            role: commit.entry.role,
            action: commit.entry.action,
            result: commit.entry.applied.clone(),
            ply: commit.entry.ply,
        });
        self.broadcast(ServerEvent::StateSnapshot(snapshot));
        self.broadcast(ServerEvent::GameStatus(status));
        if let Some(terminal) = commit.terminal {
            self.announce_game_over(terminal);
        }
    }

    /// Announces a game that ended off the board (on time): state-snapshot,
    /// game-status, game-over.
    pub fn announce_flag_fall(
        &self,
        terminal: Terminal,
        snapshot: StateSnapshot,
        status: StatusSummary,
    ) {
        self.broadcast(ServerEvent::StateSnapshot(snapshot));
        self.broadcast(ServerEvent::GameStatus(status));
        self.announce_game_over(terminal);
    }

    /// Announces an accepted reset: game-reset, then the fresh snapshot.
    pub fn announce_reset(&self, snapshot: StateSnapshot) {
        self.broadcast(ServerEvent::GameReset);
        self.broadcast(ServerEvent::StateSnapshot(snapshot));
    }

    fn announce_game_over(&self, terminal: Terminal) {
        self.broadcast(ServerEvent::GameOver {
            winner: terminal.winner,
            reason: terminal.reason,
        });
    }
}
