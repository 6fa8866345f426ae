//! The single authoritative game state.

use crate::engine::RulesEngine;
use crate::types::{Role, Terminal, TerminalReason};
use chess_duel_rules::{AppliedMove, Evaluation, Game, MoveRequest, RulesError, Status};
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Immutable record of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct MoveLogEntry {
    /// Position in the log, starting at 1.
    pub ply: u32,
    /// Role that moved.
    pub role: Role,
    /// The action as submitted.
    pub action: MoveRequest,
    /// The engine's record of the move, including the resulting position.
    pub applied: AppliedMove,
    /// When the move was committed.
    pub recorded_at: DateTime<Utc>,
}

/// Result of committing a legal action.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The appended log entry.
    pub entry: MoveLogEntry,
    /// Set when this move ended the game.
    pub terminal: Option<Terminal>,
}

/// Current position, evaluation, terminal flag and move log.
///
/// Mutated only by [`GameStore::apply`], [`GameStore::declare_timeout`] and
/// [`GameStore::reset`].
#[derive(Debug)]
pub struct GameStore<E> {
    engine: E,
    game: Game,
    evaluation: Evaluation,
    terminal: Option<Terminal>,
    log: Vec<MoveLogEntry>,
}

impl<E: RulesEngine> GameStore<E> {
    /// Store holding the engine's starting position.
    #[instrument(skip(engine))]
    pub fn new(engine: E) -> Self {
        let game = engine.starting_position();
        let evaluation = engine.evaluate(&game);
        let terminal = terminal_for(&evaluation);
        Self {
            engine,
            game,
            evaluation,
            terminal,
            log: Vec::new(),
        }
    }

    /// Role whose move it is, as computed by the engine.
    pub fn side_to_move(&self) -> Role {
        Role::for_color(self.evaluation.side_to_move)
    }

    /// Latest engine evaluation.
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// Whether the game is over.
    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Result of the finished game.
    pub fn terminal(&self) -> Option<Terminal> {
        self.terminal
    }

    /// Current position in FEN.
    pub fn position(&self) -> String {
        self.game.fen()
    }

    /// Accepted moves since the last reset, in order.
    pub fn log(&self) -> &[MoveLogEntry] {
        &self.log
    }

    /// Applies an action on behalf of `role`.
    ///
    /// On success the position, evaluation, terminal flag and log are
    /// replaced together; on failure nothing changes.
    #[instrument(skip(self), fields(fen = %self.game.fen()))]
    pub fn apply(&mut self, role: Role, action: &MoveRequest) -> Result<Commit, RulesError> {
        let (next, applied) = self.engine.apply(&self.game, action)?;
        let evaluation = self.engine.evaluate(&next);
        let terminal = terminal_for(&evaluation);

        let ply = self.log.len() as u32 + 1;
        let entry = MoveLogEntry::new(ply, role, *action, applied, Utc::now());

        self.game = next;
        self.evaluation = evaluation;
        self.terminal = terminal;
        self.log.push(entry.clone());

        info!(
            ply,
            san = %entry.applied.san,
            side_to_move = %self.side_to_move(),
            terminal = ?terminal,
            "Move committed"
        );
        Ok(Commit { entry, terminal })
    }

    /// Ends the game because `loser` ran out of time. Returns `None` when the
    /// game was already over.
    #[instrument(skip(self))]
    pub fn declare_timeout(&mut self, loser: Role) -> Option<Terminal> {
        if self.terminal.is_some() {
            return None;
        }
        let terminal = Terminal {
            reason: TerminalReason::Timeout,
            winner: Some(loser.opponent()),
        };
        self.terminal = Some(terminal);
        info!(winner = %loser.opponent(), "Game lost on time");
        Some(terminal)
    }

    /// Restores the starting position and clears the terminal flag and log.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.game = self.engine.starting_position();
        self.evaluation = self.engine.evaluate(&self.game);
        self.terminal = terminal_for(&self.evaluation);
        self.log.clear();
        info!("Game state reinitialized");
    }
}

/// Maps an engine status to the session's terminal result.
fn terminal_for(evaluation: &Evaluation) -> Option<Terminal> {
    match evaluation.status {
        Status::Ongoing => None,
        Status::Checkmate { winner } => Some(Terminal {
            reason: TerminalReason::Decisive,
            winner: Some(Role::for_color(winner)),
        }),
        Status::Stalemate => Some(Terminal {
            reason: TerminalReason::Stalemate,
            winner: None,
        }),
        Status::Draw { .. } => Some(Terminal {
            reason: TerminalReason::Draw,
            winner: None,
        }),
    }
}
