//! The authority gate: who may act right now.
//!
//! Every mutating action passes through [`AuthorityGate::authorize`] inside
//! the session's critical section, so the check always sees the state as
//! committed by the previous action.

use crate::engine::RulesEngine;
use crate::error::Denial;
use crate::registry::RoleRegistry;
use crate::store::GameStore;
use crate::types::{ParticipantId, Role};
use tracing::{instrument, warn};

/// Precondition: the submitter holds a role.
pub struct HoldsRole;

impl HoldsRole {
    /// Returns the submitter's role.
    #[instrument(skip(registry))]
    pub fn check(registry: &RoleRegistry, participant: ParticipantId) -> Result<Role, Denial> {
        registry.role_of(participant).ok_or(Denial::NotAParticipant)
    }
}

/// Precondition: the game is not over.
pub struct GameInProgress;

impl GameInProgress {
    /// Fails once the store is terminal.
    pub fn check<E: RulesEngine>(store: &GameStore<E>) -> Result<(), Denial> {
        if store.is_terminal() {
            Err(Denial::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the submitter's role is the side to move.
pub struct HoldsTurn;

impl HoldsTurn {
    /// Fails unless `role` is to move.
    pub fn check<E: RulesEngine>(store: &GameStore<E>, role: Role) -> Result<(), Denial> {
        if store.side_to_move() == role {
            Ok(())
        } else {
            Err(Denial::NotYourTurn)
        }
    }
}

/// Composite gate for move submissions.
pub struct AuthorityGate;

impl AuthorityGate {
    /// Decides whether `participant` may act now, returning the role it acts
    /// as.
    #[instrument(skip(registry, store))]
    pub fn authorize<E: RulesEngine>(
        registry: &RoleRegistry,
        store: &GameStore<E>,
        participant: ParticipantId,
    ) -> Result<Role, Denial> {
        let role = HoldsRole::check(registry, participant)?;
        GameInProgress::check(store)?;
        HoldsTurn::check(store, role).inspect_err(|_| {
            warn!(
                %participant,
                %role,
                side_to_move = %store.side_to_move(),
                "Participant tried to move out of turn"
            );
        })?;
        Ok(role)
    }
}
