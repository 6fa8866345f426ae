//! Tests for the optional game clock, run against the actor on a paused
//! tokio clock.

use chess_duel::{
    ParticipantId, Phase, ResetOutcome, Role, ServerEvent, Session, SessionHandle,
    SessionSettings, StandardChess, SubmitOutcome, TerminalReason,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::time::Instant;

type Inbox = UnboundedReceiver<ServerEvent>;

fn spawn_with_clock(seconds: u64) -> SessionHandle {
    let settings = SessionSettings {
        clock: Some(Duration::from_secs(seconds)),
    };
    let (handle, _task) = SessionHandle::spawn(StandardChess, settings, 16);
    handle
}

async fn join(handle: &SessionHandle) -> (ParticipantId, Inbox) {
    let participant = handle.issue_participant();
    let (outbox, inbox) = unbounded_channel();
    handle.connect(participant, outbox).await.expect("Session running");
    (participant, inbox)
}

fn drain(inbox: &mut Inbox) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = inbox.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_clock_runs_only_with_both_players() {
    let handle = spawn_with_clock(10);
    join(&handle).await;

    tokio::time::sleep(Duration::from_secs(3)).await;
    let clock = handle.snapshot().await.unwrap().clock.unwrap();
    assert_eq!(clock.running, None);
    assert_eq!(clock.first_mover_ms, 10_000);

    join(&handle).await;
    let clock = handle.snapshot().await.unwrap().clock.unwrap();
    assert_eq!(clock.running, Some(Role::FirstMover));
}

#[tokio::test(start_paused = true)]
async fn test_move_hands_clock_to_opponent() {
    let handle = spawn_with_clock(10);
    let (p1, _) = join(&handle).await;
    join(&handle).await;

    tokio::time::sleep(Duration::from_secs(3)).await;
    let outcome = handle
        .submit(p1, json!({ "from": "e2", "to": "e4" }))
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted { ply: 1 });

    let clock = handle.snapshot().await.unwrap().clock.unwrap();
    assert_eq!(clock.first_mover_ms, 7_000);
    assert_eq!(clock.second_mover_ms, 10_000);
    assert_eq!(clock.running, Some(Role::SecondMover));
}

#[tokio::test(start_paused = true)]
async fn test_flag_fall_ends_game() {
    let handle = spawn_with_clock(10);
    let (_, mut inbox1) = join(&handle).await;
    let (_, mut inbox2) = join(&handle).await;
    drain(&mut inbox1);
    drain(&mut inbox2);

    tokio::time::sleep(Duration::from_secs(11)).await;

    let events = drain(&mut inbox2);
    let names: Vec<_> = events.iter().map(ServerEvent::name).collect();
    assert_eq!(names, ["state-snapshot", "game-status", "game-over"]);
    assert_eq!(
        events[2],
        ServerEvent::GameOver {
            winner: Some(Role::SecondMover),
            reason: TerminalReason::Timeout,
        }
    );

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.terminal);
    assert_eq!(snapshot.reason, TerminalReason::Timeout);
    let clock = snapshot.clock.unwrap();
    assert_eq!(clock.first_mover_ms, 0);
    assert_eq!(clock.running, None);
}

#[tokio::test(start_paused = true)]
async fn test_reset_restores_full_time() {
    let handle = spawn_with_clock(10);
    let (p1, _) = join(&handle).await;
    join(&handle).await;
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert_eq!(handle.request_reset(p1).await.unwrap(), ResetOutcome::Accepted);

    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.terminal);
    let clock = snapshot.clock.unwrap();
    assert_eq!(clock.first_mover_ms, 10_000);
    assert_eq!(clock.second_mover_ms, 10_000);
    assert_eq!(clock.running, Some(Role::FirstMover));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_stops_clock() {
    let handle = spawn_with_clock(10);
    join(&handle).await;
    let (p2, _) = join(&handle).await;

    tokio::time::sleep(Duration::from_secs(2)).await;
    handle.disconnect(p2).await.unwrap();

    tokio::time::sleep(Duration::from_secs(20)).await;
    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.terminal);
    let clock = snapshot.clock.unwrap();
    assert_eq!(clock.running, None);
    assert_eq!(clock.first_mover_ms, 8_000);
}

#[test]
fn test_unrepresentable_deadline_means_no_deadline() {
    let settings = SessionSettings {
        clock: Some(Duration::MAX),
    };
    let mut session = Session::new(StandardChess, settings);
    for id in [1, 2] {
        let (outbox, _inbox) = unbounded_channel();
        session.connect(ParticipantId::new(id), outbox, Instant::now());
    }

    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.clock_deadline(), None);
    assert!(!session.poll_clock(Instant::now()));

    let clock = session.snapshot(Instant::now()).clock.unwrap();
    assert_eq!(clock.running, Some(Role::FirstMover));
}
