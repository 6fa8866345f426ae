//! Chess rules for chess_duel.
//!
//! A pure rules engine: given a position and a proposed move it decides
//! legality and produces the successor position, and it evaluates positions
//! for check, mate, stalemate and the draw rules. Nothing here performs I/O
//! or holds shared state.
//!
//! # Example
//!
//! ```
//! use chess_duel_rules::{Game, MoveRequest, Status};
//!
//! let game = Game::new();
//! let request = MoveRequest::new("e2".parse()?, "e4".parse()?);
//! let (next, applied) = game.apply(&request)?;
//! assert_eq!(applied.san, "e4");
//! assert_eq!(next.evaluate().status, Status::Ongoing);
//! # Ok::<(), chess_duel_rules::RulesError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod game;
mod notation;
mod position;
mod types;

pub use board::Board;
pub use error::RulesError;
pub use game::{AppliedMove, DrawReason, Evaluation, Game, MoveRequest, Status};
pub use position::{CastlingRights, Move, MoveKind, Position, STARTING_FEN, perft};
pub use types::{Color, Piece, PieceKind, Square};
