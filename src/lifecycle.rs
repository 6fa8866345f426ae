//! Connection lifecycle: joining and leaving the session.

use crate::broadcast::Outbox;
use crate::engine::RulesEngine;
use crate::protocol::ServerEvent;
use crate::session::Session;
use crate::types::{Assignment, ParticipantId};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

impl<E: RulesEngine> Session<E> {
    /// Admits a new connection: assigns a role (or observer seat), then
    /// sends it role-assigned, state-snapshot and game-status so it
    /// converges to the authoritative state without replaying history.
    #[instrument(skip(self, outbox, now), fields(participant = %participant))]
    pub fn connect(
        &mut self,
        participant: ParticipantId,
        outbox: Outbox,
        now: Instant,
    ) -> Assignment {
        let assignment = self.registry.assign(participant);
        self.broadcaster.register(participant, outbox);
        self.sync_clock(now);

        self.broadcaster
            .send_to(participant, ServerEvent::RoleAssigned { role: assignment });
        self.broadcaster
            .send_to(participant, ServerEvent::StateSnapshot(self.snapshot(now)));
        self.broadcaster
            .send_to(participant, ServerEvent::GameStatus(self.status(now)));

        info!(
            %assignment,
            phase = %self.phase(),
            connections = self.broadcaster.len(),
            "Participant connected"
        );
        assignment
    }

    /// Handles a closed connection. A role holder's role is vacated at once
    /// and everyone left is told; the game is neither paused nor reset.
    #[instrument(skip(self, now), fields(participant = %participant))]
    pub fn disconnect(&mut self, participant: ParticipantId, now: Instant) {
        self.broadcaster.remove(participant);

        match self.registry.vacate(participant) {
            Some(role) => {
                self.sync_clock(now);
                self.broadcaster.broadcast(ServerEvent::RoleVacated { role });
                info!(%role, phase = %self.phase(), "Role holder disconnected");
            }
            None => debug!("Observer disconnected"),
        }
    }
}
