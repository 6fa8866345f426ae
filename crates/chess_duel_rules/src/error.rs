//! Errors raised by the rules engine.

use crate::types::{PieceKind, Square};

/// Reasons the rules engine refuses an input.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RulesError {
    /// A FEN string could not be parsed.
    #[display("Invalid FEN: {}", _0)]
    InvalidFen(String),

    /// A square name was not of the form `a1`..`h8`.
    #[display("Malformed square: {:?}", _0)]
    MalformedSquare(String),

    /// No legal move goes from `from` to `to` in the current position.
    #[display("Illegal move {}{}", from, to)]
    IllegalMove {
        /// Origin square.
        from: Square,
        /// Destination square.
        to: Square,
    },

    /// The move is a promotion but the requested piece cannot be promoted to.
    #[display("Cannot promote to {:?}", _0)]
    IllegalPromotion(PieceKind),
}

impl std::error::Error for RulesError {}
