//! Error types for the session core.

use chess_duel_rules::RulesError;
use derive_more::{Display, Error};
use tracing::instrument;

/// Why the authority gate refused a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Denial {
    /// The submitter holds no role.
    #[display("Not a participant")]
    NotAParticipant,

    /// The submitter's role is not the side to move.
    #[display("Not your turn")]
    NotYourTurn,

    /// The game is already over.
    #[display("Game over")]
    GameOver,
}

impl std::error::Error for Denial {}

/// Why a submitted action was discarded.
///
/// Every variant is recovered locally: the submitter alone is told, and no
/// session state changes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
    /// Wrong turn, no role, or the game is over.
    #[display("{}", _0)]
    Unauthorized(Denial),

    /// The rules engine refused the move.
    #[display("Illegal action: {}", _0)]
    Illegal(RulesError),

    /// The action descriptor could not be parsed.
    #[display("Malformed action: {}", _0)]
    Malformed(String),
}

impl std::error::Error for Rejection {}

impl From<Denial> for Rejection {
    fn from(denial: Denial) -> Self {
        Rejection::Unauthorized(denial)
    }
}

impl From<RulesError> for Rejection {
    fn from(err: RulesError) -> Self {
        Rejection::Illegal(err)
    }
}

/// Failure to reach the session actor.
#[derive(Debug, Clone, Display, Error)]
#[display("Session error: {} at {}:{}", message, file, line)]
pub struct SessionError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SessionError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
