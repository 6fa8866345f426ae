//! Participant-to-role bindings for the session.

use crate::types::{Assignment, ParticipantId, Role};
use std::collections::BTreeSet;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Who holds which role, plus the observers.
///
/// At most one participant per role, and a participant holds at most one
/// role. Roles are vacated on disconnect, never reassigned; the next new
/// connection claims the first vacant role in priority order.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    holders: [Option<ParticipantId>; 2],
    observers: BTreeSet<ParticipantId>,
}

impl RoleRegistry {
    /// Registry with every role vacant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a new participant to the first vacant role, or records it as an
    /// observer when both roles are taken.
    #[instrument(skip(self), fields(participant = %participant))]
    pub fn assign(&mut self, participant: ParticipantId) -> Assignment {
        if let Some(role) = self.role_of(participant) {
            debug!(%role, "Participant already holds a role");
            return role.into();
        }

        for role in Role::iter() {
            let slot = &mut self.holders[role.index()];
            if slot.is_none() {
                *slot = Some(participant);
                self.observers.remove(&participant);
                info!(%role, "Role assigned");
                return role.into();
            }
        }

        self.observers.insert(participant);
        info!("Both roles taken, participant observes");
        Assignment::Observer
    }

    /// Removes a participant, returning the role it vacated, if any.
    #[instrument(skip(self), fields(participant = %participant))]
    pub fn vacate(&mut self, participant: ParticipantId) -> Option<Role> {
        self.observers.remove(&participant);
        let role = self.role_of(participant)?;
        self.holders[role.index()] = None;
        info!(%role, "Role vacated");
        Some(role)
    }

    /// Role held by a participant.
    pub fn role_of(&self, participant: ParticipantId) -> Option<Role> {
        Role::iter().find(|role| self.holders[role.index()] == Some(participant))
    }

    /// Participant holding a role.
    pub fn holder(&self, role: Role) -> Option<ParticipantId> {
        self.holders[role.index()]
    }

    /// Number of roles currently bound (0 to 2).
    pub fn bound_roles(&self) -> usize {
        self.holders.iter().filter(|h| h.is_some()).count()
    }

    /// Connected participants holding no role.
    pub fn observers(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.observers.iter().copied()
    }
}
