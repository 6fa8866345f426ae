//! Command-line interface for chess_duel.

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chess Duel - authoritative two-player chess over WebSocket
#[derive(Parser, Debug)]
#[command(name = "chess_duel")]
#[command(about = "Authoritative two-player chess session server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Per-side clock budget in seconds
        #[arg(long)]
        clock_seconds: Option<u64>,

        /// Starting position in FEN
        #[arg(long)]
        start_fen: Option<String>,
    },
}

impl Command {
    /// Config file path and flag overrides for `serve`.
    pub fn into_serve_options(self) -> (Option<PathBuf>, ConfigOverrides) {
        match self {
            Command::Serve {
                config,
                host,
                port,
                clock_seconds,
                start_fen,
            } => (
                config,
                ConfigOverrides {
                    host,
                    port,
                    clock_seconds,
                    start_fen,
                },
            ),
        }
    }
}
