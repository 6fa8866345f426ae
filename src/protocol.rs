//! Wire messages exchanged with connected clients.
//!
//! Every message is a JSON object tagged by `type`, e.g.
//! `{"type":"submit-action","action":{"from":"e2","to":"e4"}}`.

use crate::clock::ClockReading;
use crate::types::{Assignment, Phase, Role, TerminalReason};
use chess_duel_rules::{AppliedMove, MoveRequest};
use serde::{Deserialize, Serialize};

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Propose a move. The descriptor is parsed by the session so that a
    /// malformed one can be echoed back in the rejection.
    SubmitAction {
        /// Proposed action descriptor.
        action: serde_json::Value,
    },
    /// Ask to restore the starting position.
    RequestReset,
}

/// Authoritative position and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Position in FEN.
    pub position: String,
    /// Role whose move it is.
    pub side_to_move: Role,
    /// Whether the side to move is in check.
    pub in_check: bool,
    /// Whether the game is over.
    pub terminal: bool,
    /// Why the game ended, or `none`.
    pub reason: TerminalReason,
    /// Winning role, when decided.
    pub winner: Option<Role>,
    /// Number of moves played since the last reset.
    pub moves: u32,
    /// Remaining clock time, when a clock is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockReading>,
}

/// Game status summary, without the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Session lifecycle phase.
    pub phase: Phase,
    /// Role whose move it is.
    pub side_to_move: Role,
    /// Whether the side to move is in check.
    pub in_check: bool,
    /// Whether the game is over.
    pub terminal: bool,
    /// Why the game ended, or `none`.
    pub reason: TerminalReason,
    /// Winning role, when decided.
    pub winner: Option<Role>,
    /// Remaining clock time, when a clock is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<ClockReading>,
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// The role (or observer seat) given to this connection.
    RoleAssigned {
        /// Assigned seat.
        role: Assignment,
    },
    /// Full authoritative state.
    StateSnapshot(StateSnapshot),
    /// Status summary.
    GameStatus(StatusSummary),
    /// A move was accepted and applied.
    MoveApplied {
        /// Role that moved.
        role: Role,
        /// The action as submitted.
        action: MoveRequest,
        /// The engine's record of the move.
        result: AppliedMove,
        /// Position of the move in the log, starting at 1.
        ply: u32,
    },
    /// The submitter's action was discarded.
    MoveRejected {
        /// The action exactly as submitted.
        action: serde_json::Value,
        /// Human-readable reason.
        reason: String,
    },
    /// The game ended.
    GameOver {
        /// Winning role; `None` for draws and stalemate.
        winner: Option<Role>,
        /// How the game ended.
        reason: TerminalReason,
    },
    /// A role holder disconnected; the role may be claimed again.
    RoleVacated {
        /// The vacated role.
        role: Role,
    },
    /// The game was restored to its starting position.
    GameReset,
}

impl ServerEvent {
    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::RoleAssigned { .. } => "role-assigned",
            ServerEvent::StateSnapshot(_) => "state-snapshot",
            ServerEvent::GameStatus(_) => "game-status",
            ServerEvent::MoveApplied { .. } => "move-applied",
            ServerEvent::MoveRejected { .. } => "move-rejected",
            ServerEvent::GameOver { .. } => "game-over",
            ServerEvent::RoleVacated { .. } => "role-vacated",
            ServerEvent::GameReset => "game-reset",
        }
    }
}
