//! Identity, role and status types shared across the session core.

use chess_duel_rules::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity of one connection, issued by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(u64);

impl ParticipantId {
    /// Wraps a raw connection number.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw connection number.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// One of the two playing roles, in claim priority order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    /// Moves first (White).
    FirstMover,
    /// Moves second (Black).
    SecondMover,
}

impl Role {
    /// The other role.
    pub fn opponent(self) -> Self {
        match self {
            Role::FirstMover => Role::SecondMover,
            Role::SecondMover => Role::FirstMover,
        }
    }

    /// Piece color this role plays.
    pub fn color(self) -> Color {
        match self {
            Role::FirstMover => Color::White,
            Role::SecondMover => Color::Black,
        }
    }

    /// Role that plays the given color.
    pub fn for_color(color: Color) -> Self {
        match color {
            Color::White => Role::FirstMover,
            Color::Black => Role::SecondMover,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Role::FirstMover => 0,
            Role::SecondMover => 1,
        }
    }
}

/// What a new connection was assigned: a role, or read-only observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Assignment {
    /// Holds the first-mover role.
    FirstMover,
    /// Holds the second-mover role.
    SecondMover,
    /// Holds no role.
    Observer,
}

impl Assignment {
    /// The role held, if any.
    pub fn role(self) -> Option<Role> {
        match self {
            Assignment::FirstMover => Some(Role::FirstMover),
            Assignment::SecondMover => Some(Role::SecondMover),
            Assignment::Observer => None,
        }
    }
}

impl From<Role> for Assignment {
    fn from(role: Role) -> Self {
        match role {
            Role::FirstMover => Assignment::FirstMover,
            Role::SecondMover => Assignment::SecondMover,
        }
    }
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TerminalReason {
    /// Game still in progress.
    #[default]
    None,
    /// One side won on the board.
    Decisive,
    /// Side to move has no legal move and is not in check.
    Stalemate,
    /// Drawn by rule.
    Draw,
    /// A side ran out of clock time.
    Timeout,
}

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terminal {
    /// How the game ended.
    pub reason: TerminalReason,
    /// Winning role; `None` for stalemate and draws.
    pub winner: Option<Role>,
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    /// Fewer than two roles bound.
    Forming,
    /// Both roles bound and the game is not over.
    Active,
    /// The game is over; only a reset resumes play.
    Terminal,
}
