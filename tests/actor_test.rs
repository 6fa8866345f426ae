//! Tests for the session actor: serialization of concurrent submissions and
//! behavior after shutdown.

use chess_duel::{
    Assignment, Denial, FromPosition, Rejection, Role, SessionHandle, SessionSettings,
    StandardChess, SubmitOutcome,
};
use serde_json::json;
use std::collections::BTreeSet;
use tokio::sync::mpsc::unbounded_channel;

fn spawn() -> (SessionHandle, tokio::task::JoinHandle<()>) {
    SessionHandle::spawn(StandardChess, SessionSettings::default(), 64)
}

#[tokio::test]
async fn test_issued_participants_are_unique() {
    let (handle, _task) = spawn();
    let other = handle.clone();
    let ids: BTreeSet<_> = (0..50)
        .map(|i| {
            if i % 2 == 0 {
                handle.issue_participant()
            } else {
                other.issue_participant()
            }
        })
        .collect();
    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn test_concurrent_duplicate_submissions_apply_once() {
    let (handle, _task) = spawn();
    let p1 = handle.issue_participant();
    let (outbox, _inbox) = unbounded_channel();
    assert_eq!(
        handle.connect(p1, outbox).await.unwrap(),
        Assignment::FirstMover
    );

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle
                    .submit(p1, json!({ "from": "e2", "to": "e4" }))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            SubmitOutcome::Accepted { ply } => {
                assert_eq!(ply, 1);
                accepted += 1;
            }
            SubmitOutcome::Rejected(rejection) => assert_eq!(
                rejection,
                Rejection::Unauthorized(Denial::NotYourTurn)
            ),
        }
    }
    assert_eq!(accepted, 1);

    let history = handle.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(handle.snapshot().await.unwrap().side_to_move, Role::SecondMover);
}

#[tokio::test]
async fn test_racing_players_never_both_move_out_of_order() {
    let (handle, _task) = spawn();
    let p1 = handle.issue_participant();
    let p2 = handle.issue_participant();
    for who in [p1, p2] {
        let (outbox, _inbox) = unbounded_channel();
        handle.connect(who, outbox).await.unwrap();
    }

    let (first, second) = tokio::join!(
        handle.submit(p1, json!({ "from": "e2", "to": "e4" })),
        handle.submit(p2, json!({ "from": "e7", "to": "e5" })),
    );
    let accepted = [first.unwrap(), second.unwrap()]
        .into_iter()
        .filter(|outcome| matches!(outcome, SubmitOutcome::Accepted { .. }))
        .count();

    let history = handle.history().await.unwrap();
    assert_eq!(history.len(), accepted);
    assert_eq!(history[0].role, Role::FirstMover);
    for (index, entry) in history.iter().enumerate() {
        assert_eq!(entry.ply as usize, index + 1);
    }
}

#[tokio::test]
async fn test_custom_start_position() {
    let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
    let (handle, _task) = SessionHandle::spawn(
        FromPosition::new(fen).unwrap(),
        SessionSettings::default(),
        8,
    );
    assert_eq!(handle.snapshot().await.unwrap().position, fen);
    assert!(FromPosition::new("not a position").is_err());
}

#[tokio::test]
async fn test_handle_errors_after_shutdown() {
    let (handle, task) = spawn();
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    assert!(handle.snapshot().await.is_err());
    let (outbox, _inbox) = unbounded_channel();
    assert!(handle.connect(handle.issue_participant(), outbox).await.is_err());
}

#[tokio::test]
async fn test_shutdown_closes_outboxes() {
    let (handle, task) = spawn();
    let (outbox, mut inbox) = unbounded_channel();
    handle.connect(handle.issue_participant(), outbox).await.unwrap();

    handle.shutdown().await.unwrap();
    task.await.unwrap();

    let mut received = 0;
    while inbox.recv().await.is_some() {
        received += 1;
    }
    assert_eq!(received, 3);
}
