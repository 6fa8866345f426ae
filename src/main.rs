//! Chess Duel - server entry point.

#![warn(missing_docs)]

use anyhow::Result;
use chess_duel::{Cli, Command, FromPosition, ServerConfig, SessionHandle, StandardChess};
use clap::Parser;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        command @ Command::Serve { .. } => {
            let (path, overrides) = command.into_serve_options();
            let config = ServerConfig::load(path.as_deref(), overrides)?;
            run_server(config).await
        }
    }
}

/// Runs the game server until Ctrl-C.
#[instrument(skip_all, fields(port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!("Starting Chess Duel server");

    let settings = config.session_settings();
    let capacity = *config.mailbox_capacity();
    let (session, actor) = match config.start_fen() {
        Some(fen) => {
            info!(%fen, "Using custom starting position");
            SessionHandle::spawn(FromPosition::new(fen)?, settings, capacity)
        }
        None => SessionHandle::spawn(StandardChess, settings, capacity),
    };

    let listener = tokio::net::TcpListener::bind(config.addr()?).await?;
    chess_duel::serve(listener, chess_duel::router(session.clone())).await?;

    if let Err(e) = session.shutdown().await {
        warn!(error = %e, "Session actor already stopped");
    }
    actor.await?;
    info!("Server stopped");
    Ok(())
}
