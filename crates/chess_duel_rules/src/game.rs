//! A game in progress: position plus the history needed for draw detection.

use crate::error::RulesError;
use crate::notation;
use crate::position::{Move, Position};
use crate::types::{Color, PieceKind, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A move as a player proposes it: origin, destination and optional
/// promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Promotion piece; queen is assumed when a pawn reaches the last rank
    /// without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    /// Creates a move request without promotion.
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Adds a promotion piece.
    pub fn promoting_to(mut self, piece: PieceKind) -> Self {
        self.promotion = Some(piece);
        self
    }
}

/// Record of a move that was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    /// Side that moved.
    pub color: Color,
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Kind of the moving piece.
    pub piece: PieceKind,
    /// Kind of the captured piece, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceKind>,
    /// Promotion piece, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
    /// Move flags (see [`Move::flags`]).
    pub flags: String,
    /// Standard algebraic notation.
    pub san: String,
    /// Long algebraic notation.
    pub lan: String,
    /// FEN before the move.
    pub before: String,
    /// FEN after the move.
    pub after: String,
}

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawReason {
    /// One hundred plies without a capture or pawn move.
    FiftyMoveRule,
    /// No sequence of legal moves can produce mate.
    InsufficientMaterial,
    /// Same position reached for the third time.
    ThreefoldRepetition,
}

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Status {
    /// Play continues.
    Ongoing,
    /// The side to move is mated.
    Checkmate {
        /// The side that delivered mate.
        winner: Color,
    },
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// Drawn by rule.
    Draw {
        /// Which rule applied.
        reason: DrawReason,
    },
}

/// Evaluation of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Evaluation {
    /// Side whose move it is.
    pub side_to_move: Color,
    /// Whether that side is in check.
    pub in_check: bool,
    /// Terminal status.
    pub status: Status,
}

impl Evaluation {
    /// True once the game can no longer continue.
    pub fn is_terminal(&self) -> bool {
        self.status != Status::Ongoing
    }
}

/// Chess game: current position and the positions seen so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    position: Position,
    seen: Vec<String>,
}

impl Game {
    /// Game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::starting())
    }

    /// Game starting from a FEN position.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    fn from_position(position: Position) -> Self {
        let seen = vec![position.repetition_key()];
        Self { position, seen }
    }

    /// Current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Current position as FEN.
    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    /// Legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves()
    }

    /// Plays a move, returning the successor game and a record of the move.
    ///
    /// `self` is left untouched; an illegal request yields an error.
    #[instrument(skip(self), fields(fen = %self.position.to_fen()))]
    pub fn apply(&self, request: &MoveRequest) -> Result<(Game, AppliedMove), RulesError> {
        let legal = self.position.legal_moves();
        let candidates: Vec<&Move> = legal
            .iter()
            .filter(|m| m.from == request.from && m.to == request.to)
            .collect();

        let Some(first) = candidates.first() else {
            debug!("No legal move matches request");
            return Err(RulesError::IllegalMove {
                from: request.from,
                to: request.to,
            });
        };

        let chosen = if first.promotion.is_some() {
            let wanted = request.promotion.unwrap_or(PieceKind::Queen);
            candidates
                .iter()
                .find(|m| m.promotion == Some(wanted))
                .copied()
                .ok_or(RulesError::IllegalPromotion(wanted))?
        } else {
            *first
        };

        let san = notation::san(&self.position, chosen, &legal);
        let next = self.position.make(chosen);

        let record = AppliedMove {
            color: self.position.side_to_move(),
            from: chosen.from,
            to: chosen.to,
            piece: chosen.piece,
            captured: chosen.captured,
            promotion: chosen.promotion,
            flags: chosen.flags(),
            san,
            lan: chosen.lan(),
            before: self.position.to_fen(),
            after: next.to_fen(),
        };

        let mut seen = self.seen.clone();
        seen.push(next.repetition_key());
        debug!(san = %record.san, "Move applied");

        Ok((
            Game {
                position: next,
                seen,
            },
            record,
        ))
    }

    /// Evaluates the current position.
    ///
    /// Mate and stalemate take precedence over the draw rules.
    pub fn evaluate(&self) -> Evaluation {
        let side_to_move = self.position.side_to_move();
        let in_check = self.position.in_check();
        let no_moves = self.position.legal_moves().is_empty();

        let status = if no_moves && in_check {
            Status::Checkmate {
                winner: side_to_move.opponent(),
            }
        } else if no_moves {
            Status::Stalemate
        } else if self.position.halfmove_clock() >= 100 {
            Status::Draw {
                reason: DrawReason::FiftyMoveRule,
            }
        } else if self.position.board().is_insufficient_material() {
            Status::Draw {
                reason: DrawReason::InsufficientMaterial,
            }
        } else if self.repetitions() >= 3 {
            Status::Draw {
                reason: DrawReason::ThreefoldRepetition,
            }
        } else {
            Status::Ongoing
        };

        Evaluation {
            side_to_move,
            in_check,
            status,
        }
    }

    /// How many times the current position has occurred.
    pub fn repetitions(&self) -> usize {
        let current = self.position.repetition_key();
        self.seen.iter().filter(|key| **key == current).count()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
