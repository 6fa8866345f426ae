//! Tests for the HTTP routes and the WebSocket transport.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chess_duel::{
    Assignment, MoveLogEntry, Role, ServerEvent, SessionHandle, SessionSettings, StandardChess,
    StateSnapshot,
};
use chess_duel_rules::STARTING_FEN;
use futures::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::unbounded_channel;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_healthz() {
    let (session, _task) = SessionHandle::spawn(StandardChess, SessionSettings::default(), 8);
    let (status, body) = get(chess_duel::router(session), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_state_and_moves_routes() {
    let (session, _task) = SessionHandle::spawn(StandardChess, SessionSettings::default(), 8);
    let app = chess_duel::router(session.clone());

    let (status, body) = get(app.clone(), "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: StateSnapshot = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot.position, STARTING_FEN);

    let player = session.issue_participant();
    let (outbox, _inbox) = unbounded_channel();
    session.connect(player, outbox).await.unwrap();
    session
        .submit(player, json!({ "from": "g1", "to": "f3" }))
        .await
        .unwrap();

    let (status, body) = get(app.clone(), "/api/moves").await;
    assert_eq!(status, StatusCode::OK);
    let moves: Vec<MoveLogEntry> = serde_json::from_slice(&body).unwrap();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].applied.san, "Nf3");

    let (_, body) = get(app, "/api/state").await;
    let snapshot: StateSnapshot = serde_json::from_slice(&body).unwrap();
    assert_eq!(snapshot.moves, 1);
}

#[tokio::test]
async fn test_stopped_session_is_unavailable() {
    let (session, task) = SessionHandle::spawn(StandardChess, SessionSettings::default(), 8);
    let app = chess_duel::router(session.clone());
    session.shutdown().await.unwrap();
    task.await.unwrap();

    let (status, _) = get(app, "/api/state").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route() {
    let (session, _task) = SessionHandle::spawn(StandardChess, SessionSettings::default(), 8);
    let (status, _) = get(chess_duel::router(session), "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Serves a fresh session on an ephemeral port.
async fn spawn_server() -> SocketAddr {
    let (session, _task) = SessionHandle::spawn(StandardChess, SessionSettings::default(), 8);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, chess_duel::router(session))
            .await
            .unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    client
}

/// Next event from the server, skipping control frames.
async fn next_event(client: &mut Client) -> ServerEvent {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timed out waiting for an event")
            .expect("Connection ended")
            .unwrap();
        if let Message::Text(_) = frame {
            return serde_json::from_str(frame.to_text().unwrap()).unwrap();
        }
    }
}

async fn expect_join(client: &mut Client, seat: Assignment) {
    assert_eq!(
        next_event(client).await,
        ServerEvent::RoleAssigned { role: seat }
    );
    match next_event(client).await {
        ServerEvent::StateSnapshot(snapshot) => {
            assert_eq!(snapshot.position, STARTING_FEN);
            assert_eq!(snapshot.moves, 0);
        }
        other => panic!("Expected state-snapshot, got {}", other.name()),
    }
    let status = next_event(client).await;
    assert_eq!(status.name(), "game-status");
}

#[tokio::test]
async fn test_websocket_join_reject_and_vacate() {
    let addr = spawn_server().await;
    let mut first = connect(addr).await;
    expect_join(&mut first, Assignment::FirstMover).await;
    let mut second = connect(addr).await;
    expect_join(&mut second, Assignment::SecondMover).await;

    first.send(Message::text("garbage")).await.unwrap();
    match next_event(&mut first).await {
        ServerEvent::MoveRejected { action, .. } => {
            assert_eq!(action, Value::String("garbage".to_string()))
        }
        other => panic!("Expected move-rejected, got {}", other.name()),
    }

    let unknown = json!({ "type": "resign" });
    first.send(Message::text(unknown.to_string())).await.unwrap();
    match next_event(&mut first).await {
        ServerEvent::MoveRejected { action, .. } => assert_eq!(action, unknown),
        other => panic!("Expected move-rejected, got {}", other.name()),
    }

    first.send(Message::binary(vec![1u8, 2, 3])).await.unwrap();
    match next_event(&mut first).await {
        ServerEvent::MoveRejected { action, .. } => assert_eq!(action, Value::Null),
        other => panic!("Expected move-rejected, got {}", other.name()),
    }

    first.close(None).await.unwrap();
    assert_eq!(
        next_event(&mut second).await,
        ServerEvent::RoleVacated {
            role: Role::FirstMover
        }
    );
}

#[tokio::test]
async fn test_websocket_move_reaches_both_players() {
    let addr = spawn_server().await;
    let mut first = connect(addr).await;
    expect_join(&mut first, Assignment::FirstMover).await;
    let mut second = connect(addr).await;
    expect_join(&mut second, Assignment::SecondMover).await;

    let submit = json!({ "type": "submit-action", "action": { "from": "e2", "to": "e4" } });
    first.send(Message::text(submit.to_string())).await.unwrap();

    for client in [&mut first, &mut second] {
        match next_event(client).await {
            ServerEvent::MoveApplied { role, ply, .. } => {
                assert_eq!(role, Role::FirstMover);
                assert_eq!(ply, 1);
            }
            other => panic!("Expected move-applied, got {}", other.name()),
        }
        match next_event(client).await {
            ServerEvent::StateSnapshot(snapshot) => assert_eq!(snapshot.moves, 1),
            other => panic!("Expected state-snapshot, got {}", other.name()),
        }
        assert_eq!(next_event(client).await.name(), "game-status");
    }
}
