//! The session actor and its handle.
//!
//! The actor task owns the [`Session`] and drains a bounded mailbox one
//! command at a time. Transport tasks talk to it only through a cloneable
//! [`SessionHandle`]. Besides commands, the actor wakes when a running clock
//! is due to run out.

use crate::broadcast::Outbox;
use crate::engine::RulesEngine;
use crate::error::SessionError;
use crate::protocol::StateSnapshot;
use crate::reset::ResetOutcome;
use crate::session::{Session, SessionSettings, SubmitOutcome};
use crate::store::MoveLogEntry;
use crate::types::{Assignment, ParticipantId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Default mailbox depth.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Requests processed by the session actor.
#[derive(Debug)]
pub enum SessionCommand {
    /// A new connection.
    Connect {
        /// Identity issued by the transport.
        participant: ParticipantId,
        /// The connection's event queue.
        outbox: Outbox,
        /// Receives the assignment.
        reply: oneshot::Sender<Assignment>,
    },
    /// A proposed move.
    Submit {
        /// Submitter.
        participant: ParticipantId,
        /// Action descriptor as received.
        action: serde_json::Value,
        /// Receives the outcome.
        reply: oneshot::Sender<SubmitOutcome>,
    },
    /// A frame that was not a valid client message.
    Malformed {
        /// Sender.
        participant: ParticipantId,
        /// The frame, as JSON when it parsed, else as a string.
        payload: serde_json::Value,
        /// Parser diagnostic.
        detail: String,
    },
    /// A reset request.
    Reset {
        /// Requester.
        participant: ParticipantId,
        /// Receives the outcome.
        reply: oneshot::Sender<ResetOutcome>,
    },
    /// A closed connection.
    Disconnect {
        /// The departed participant.
        participant: ParticipantId,
    },
    /// Read the current state.
    Snapshot {
        /// Receives the snapshot.
        reply: oneshot::Sender<StateSnapshot>,
    },
    /// Read the move log.
    History {
        /// Receives the log.
        reply: oneshot::Sender<Vec<MoveLogEntry>>,
    },
    /// Stop the actor.
    Shutdown,
}

/// Cloneable front door to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
    next_participant: Arc<AtomicU64>,
}

impl SessionHandle {
    /// Creates a session and spawns its actor on the current runtime.
    #[instrument(skip(engine))]
    pub fn spawn<E: RulesEngine>(
        engine: E,
        settings: SessionSettings,
        mailbox_capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        let session = Session::new(engine, settings);
        let task = tokio::spawn(run(session, rx));
        info!(mailbox_capacity, "Session actor spawned");
        (
            Self {
                tx,
                next_participant: Arc::new(AtomicU64::new(1)),
            },
            task,
        )
    }

    /// Issues a fresh connection identity.
    pub fn issue_participant(&self) -> ParticipantId {
        ParticipantId::new(self.next_participant.fetch_add(1, Ordering::Relaxed))
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| SessionError::new("Session actor has stopped"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response
            .await
            .map_err(|_| SessionError::new("Session actor dropped the request"))
    }

    /// Joins the session. Events for this participant are queued on `outbox`.
    #[instrument(skip(self, outbox))]
    pub async fn connect(
        &self,
        participant: ParticipantId,
        outbox: Outbox,
    ) -> Result<Assignment, SessionError> {
        self.request(|reply| SessionCommand::Connect {
            participant,
            outbox,
            reply,
        })
        .await
    }

    /// Submits an action descriptor on behalf of `participant`.
    #[instrument(skip(self, action))]
    pub async fn submit(
        &self,
        participant: ParticipantId,
        action: serde_json::Value,
    ) -> Result<SubmitOutcome, SessionError> {
        self.request(|reply| SessionCommand::Submit {
            participant,
            action,
            reply,
        })
        .await
    }

    /// Reports a frame that could not be parsed; the sender gets a
    /// move-rejected event carrying it.
    #[instrument(skip(self, payload))]
    pub async fn reject_malformed(
        &self,
        participant: ParticipantId,
        payload: serde_json::Value,
        detail: String,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Malformed {
            participant,
            payload,
            detail,
        })
        .await
    }

    /// Requests a reset on behalf of `participant`.
    #[instrument(skip(self))]
    pub async fn request_reset(
        &self,
        participant: ParticipantId,
    ) -> Result<ResetOutcome, SessionError> {
        self.request(|reply| SessionCommand::Reset { participant, reply })
            .await
    }

    /// Leaves the session.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, participant: ParticipantId) -> Result<(), SessionError> {
        self.send(SessionCommand::Disconnect { participant }).await
    }

    /// Current authoritative state.
    pub async fn snapshot(&self) -> Result<StateSnapshot, SessionError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    /// Moves accepted since the last reset.
    pub async fn history(&self) -> Result<Vec<MoveLogEntry>, SessionError> {
        self.request(|reply| SessionCommand::History { reply }).await
    }

    /// Stops the actor. Outboxes are dropped, ending every connection writer.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }
}

/// Actor loop: one command at a time, plus clock expiry.
async fn run<E: RulesEngine>(mut session: Session<E>, mut rx: mpsc::Receiver<SessionCommand>) {
    loop {
        let deadline = session.clock_deadline();
        let command = tokio::select! {
            command = rx.recv() => command,
            _ = expiry(deadline) => {
                session.poll_clock(Instant::now());
                continue;
            }
        };
        let Some(command) = command else {
            debug!("All handles dropped");
            break;
        };

        let now = Instant::now();
        session.poll_clock(now);

        match command {
            SessionCommand::Connect {
                participant,
                outbox,
                reply,
            } => {
                let assignment = session.connect(participant, outbox, now);
                let _ = reply.send(assignment);
            }
            SessionCommand::Submit {
                participant,
                action,
                reply,
            } => {
                let outcome = session.submit(participant, action, now);
                let _ = reply.send(outcome);
            }
            SessionCommand::Malformed {
                participant,
                payload,
                detail,
            } => {
                session.reject_malformed(participant, payload, detail);
            }
            SessionCommand::Reset { participant, reply } => {
                let outcome = session.request_reset(participant, now);
                let _ = reply.send(outcome);
            }
            SessionCommand::Disconnect { participant } => {
                session.disconnect(participant, now);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(session.snapshot(now));
            }
            SessionCommand::History { reply } => {
                let _ = reply.send(session.history());
            }
            SessionCommand::Shutdown => break,
        }
    }
    info!("Session actor stopped");
}

async fn expiry(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
