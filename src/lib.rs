//! Chess Duel library - authoritative two-player chess sessions
//!
//! A single game session that binds connecting participants to the two
//! playing roles, gates every move on role and turn, keeps the one
//! authoritative position, and fans results out to every connection.
//!
//! # Architecture
//!
//! - **Registry**: first-free role assignment, observers beyond two
//! - **Authority gate**: role, game-over and turn checks
//! - **Store**: position, evaluation, terminal flag and move log
//! - **Broadcaster**: per-connection outboxes, ordered fan-out
//! - **Actor**: one task owns the session and serializes every mutation
//! - **Server**: axum WebSocket transport plus read-only HTTP routes
//!
//! Chess rules live in the `chess_duel_rules` crate and are reached through
//! the [`RulesEngine`] trait.
//!
//! # Example
//!
//! ```no_run
//! use chess_duel::{SessionHandle, SessionSettings, StandardChess};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (session, _task) = SessionHandle::spawn(StandardChess, SessionSettings::default(), 64);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! chess_duel::serve(listener, chess_duel::router(session)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod actor;
mod authority;
mod broadcast;
mod cli;
mod clock;
mod config;
mod engine;
mod error;
mod lifecycle;
mod protocol;
mod registry;
mod reset;
mod server;
mod session;
mod store;
mod types;

// Crate-level exports - Session core
pub use actor::{DEFAULT_MAILBOX_CAPACITY, SessionCommand, SessionHandle};
pub use authority::{AuthorityGate, GameInProgress, HoldsRole, HoldsTurn};
pub use broadcast::{Broadcaster, Outbox};
pub use registry::RoleRegistry;
pub use reset::ResetOutcome;
pub use session::{Session, SessionSettings, SubmitOutcome};
pub use store::{Commit, GameStore, MoveLogEntry};

// Crate-level exports - Rules seam
pub use engine::{FromPosition, RulesEngine, StandardChess};

// Crate-level exports - Wire protocol
pub use clock::{ClockReading, GameClock};
pub use protocol::{ClientMessage, ServerEvent, StateSnapshot, StatusSummary};

// Crate-level exports - Shared types and errors
pub use error::{Denial, Rejection, SessionError};
pub use types::{Assignment, ParticipantId, Phase, Role, Terminal, TerminalReason};

// Crate-level exports - Configuration and transport
pub use cli::{Cli, Command};
pub use config::{ConfigError, ConfigOverrides, MAX_CLOCK_SECONDS, ServerConfig};
pub use server::{AppState, router, serve};
