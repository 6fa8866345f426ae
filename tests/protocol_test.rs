//! Tests for the JSON wire format.

use chess_duel::{
    Assignment, ClientMessage, Phase, Role, ServerEvent, StateSnapshot, StatusSummary,
    TerminalReason,
};
use chess_duel_rules::STARTING_FEN;
use serde_json::json;

#[test]
fn test_parse_client_messages() {
    let submit: ClientMessage = serde_json::from_value(json!({
        "type": "submit-action",
        "action": { "from": "e7", "to": "e8", "promotion": "n" }
    }))
    .unwrap();
    assert_eq!(
        submit,
        ClientMessage::SubmitAction {
            action: json!({ "from": "e7", "to": "e8", "promotion": "n" })
        }
    );

    let reset: ClientMessage = serde_json::from_str(r#"{"type":"request-reset"}"#).unwrap();
    assert_eq!(reset, ClientMessage::RequestReset);
}

#[test]
fn test_unknown_client_message_fails() {
    assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"resign"}"#).is_err());
    assert!(serde_json::from_str::<ClientMessage>(r#"{"action":{}}"#).is_err());
    assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"submit-action"}"#).is_err());
}

#[test]
fn test_role_and_lifecycle_events() {
    let assigned = ServerEvent::RoleAssigned {
        role: Assignment::Observer,
    };
    assert_eq!(
        serde_json::to_value(&assigned).unwrap(),
        json!({ "type": "role-assigned", "role": "observer" })
    );

    let vacated = ServerEvent::RoleVacated {
        role: Role::SecondMover,
    };
    assert_eq!(
        serde_json::to_value(&vacated).unwrap(),
        json!({ "type": "role-vacated", "role": "second-mover" })
    );

    assert_eq!(
        serde_json::to_value(ServerEvent::GameReset).unwrap(),
        json!({ "type": "game-reset" })
    );
}

#[test]
fn test_snapshot_is_flattened_into_event() {
    let snapshot = StateSnapshot {
        position: STARTING_FEN.to_string(),
        side_to_move: Role::FirstMover,
        in_check: false,
        terminal: false,
        reason: TerminalReason::None,
        winner: None,
        moves: 0,
        clock: None,
    };
    let value = serde_json::to_value(ServerEvent::StateSnapshot(snapshot.clone())).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "state-snapshot",
            "position": STARTING_FEN,
            "side_to_move": "first-mover",
            "in_check": false,
            "terminal": false,
            "reason": "none",
            "winner": null,
            "moves": 0
        })
    );

    let back: ServerEvent = serde_json::from_value(value).unwrap();
    assert_eq!(back, ServerEvent::StateSnapshot(snapshot));
}

#[test]
fn test_status_and_game_over_events() {
    let status = StatusSummary {
        phase: Phase::Terminal,
        side_to_move: Role::SecondMover,
        in_check: false,
        terminal: true,
        reason: TerminalReason::Stalemate,
        winner: None,
        clock: None,
    };
    let value = serde_json::to_value(ServerEvent::GameStatus(status)).unwrap();
    assert_eq!(value["type"], "game-status");
    assert_eq!(value["phase"], "terminal");
    assert_eq!(value["reason"], "stalemate");

    let over = ServerEvent::GameOver {
        winner: Some(Role::FirstMover),
        reason: TerminalReason::Timeout,
    };
    assert_eq!(
        serde_json::to_value(&over).unwrap(),
        json!({ "type": "game-over", "winner": "first-mover", "reason": "timeout" })
    );
}

#[test]
fn test_rejection_echoes_action() {
    let action = json!({ "from": "e2", "to": "e5" });
    let rejected = ServerEvent::MoveRejected {
        action: action.clone(),
        reason: "Not your turn".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&rejected).unwrap(),
        json!({ "type": "move-rejected", "action": action, "reason": "Not your turn" })
    );
    assert_eq!(rejected.name(), "move-rejected");
}
