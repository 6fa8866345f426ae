//! The seam between the session core and the rules engine.

use chess_duel_rules::{AppliedMove, Evaluation, Game, MoveRequest, RulesError};
use tracing::instrument;

/// Pure state-transition function over positions.
///
/// The session never inspects a position itself; side to move, check and
/// terminal status always come from [`RulesEngine::evaluate`].
pub trait RulesEngine: Send + 'static {
    /// Position a fresh or reset game starts from.
    fn starting_position(&self) -> Game;

    /// Reports side to move, check and terminal status of a position.
    fn evaluate(&self, position: &Game) -> Evaluation;

    /// Applies an action, returning the successor position and a record of
    /// the move, or the reason it is illegal.
    fn apply(
        &self,
        position: &Game,
        action: &MoveRequest,
    ) -> Result<(Game, AppliedMove), RulesError>;
}

/// Standard chess from the usual starting position.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RulesEngine for StandardChess {
    fn starting_position(&self) -> Game {
        Game::new()
    }

    fn evaluate(&self, position: &Game) -> Evaluation {
        position.evaluate()
    }

    #[instrument(skip(self, position))]
    fn apply(
        &self,
        position: &Game,
        action: &MoveRequest,
    ) -> Result<(Game, AppliedMove), RulesError> {
        position.apply(action)
    }
}

/// Chess from a custom starting position.
#[derive(Debug, Clone)]
pub struct FromPosition {
    start: Game,
}

impl FromPosition {
    /// Uses the given FEN as the starting position.
    #[instrument]
    pub fn new(fen: &str) -> Result<Self, RulesError> {
        Ok(Self {
            start: Game::from_fen(fen)?,
        })
    }
}

impl RulesEngine for FromPosition {
    fn starting_position(&self) -> Game {
        self.start.clone()
    }

    fn evaluate(&self, position: &Game) -> Evaluation {
        position.evaluate()
    }

    fn apply(
        &self,
        position: &Game,
        action: &MoveRequest,
    ) -> Result<(Game, AppliedMove), RulesError> {
        position.apply(action)
    }
}
