//! HTTP and WebSocket transport.
//!
//! Each WebSocket connection gets a fresh participant id, joins the session
//! and forwards its frames to the session actor. Events queued for it are
//! written out by a dedicated writer task, so a slow peer only delays itself.

use crate::actor::SessionHandle;
use crate::error::SessionError;
use crate::protocol::{ClientMessage, ServerEvent};
use crate::types::ParticipantId;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Shared state of the HTTP layer.
#[derive(Debug, Clone)]
pub struct AppState {
    session: SessionHandle,
}

/// Builds the application router around a running session.
pub fn router(session: SessionHandle) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/api/state", get(current_state))
        .route("/api/moves", get(move_history))
        .with_state(AppState { session })
}

/// Serves `app` until Ctrl-C.
#[instrument(skip(listener, app))]
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn current_state(State(state): State<AppState>) -> Result<Response, SessionError> {
    let snapshot = state.session.snapshot().await?;
    Ok(Json(snapshot).into_response())
}

async fn move_history(State(state): State<AppState>) -> Result<Response, SessionError> {
    let history = state.session.history().await?;
    Ok(Json(history).into_response())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.session))
}

/// Drives one WebSocket connection from join to disconnect.
#[instrument(skip_all, fields(participant = tracing::field::Empty))]
async fn handle_socket(socket: WebSocket, session: SessionHandle) {
    let participant = session.issue_participant();
    tracing::Span::current().record("participant", tracing::field::display(participant));

    let (mut sink, mut stream) = socket.split();
    let (outbox, mut events) = mpsc::unbounded_channel::<ServerEvent>();

    let writer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, event = event.name(), "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!("Socket closed while writing");
                break;
            }
        }
        let _ = sink.close().await;
    });

    match session.connect(participant, outbox).await {
        Ok(assignment) => info!(%assignment, "WebSocket joined"),
        Err(e) => {
            warn!(error = %e, "Could not join session");
            writer.abort();
            return;
        }
    }

    while let Some(frame) = stream.next().await {
        let result = match frame {
            Ok(Message::Text(text)) => handle_text(&session, participant, text.as_str()).await,
            Ok(Message::Binary(_)) => {
                session
                    .reject_malformed(
                        participant,
                        serde_json::Value::Null,
                        "Binary frames are not supported".to_string(),
                    )
                    .await
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => Ok(()),
            Err(e) => {
                debug!(error = %e, "Socket read failed");
                break;
            }
        };
        if let Err(e) = result {
            warn!(error = %e, "Session unavailable, closing connection");
            break;
        }
    }

    if let Err(e) = session.disconnect(participant).await {
        debug!(error = %e, "Session already stopped");
    }
    writer.abort();
    info!("WebSocket closed");
}

/// Parses one text frame and forwards it to the session.
async fn handle_text(
    session: &SessionHandle,
    participant: ParticipantId,
    text: &str,
) -> Result<(), SessionError> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return session
                .reject_malformed(
                    participant,
                    serde_json::Value::String(text.to_string()),
                    e.to_string(),
                )
                .await;
        }
    };

    match serde_json::from_value::<ClientMessage>(value.clone()) {
        Ok(ClientMessage::SubmitAction { action }) => {
            session.submit(participant, action).await?;
        }
        Ok(ClientMessage::RequestReset) => {
            session.request_reset(participant).await?;
        }
        Err(e) => session.reject_malformed(participant, value, e.to_string()).await?,
    }
    Ok(())
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        error!(error = %self, "Session unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, self.message).into_response()
    }
}
