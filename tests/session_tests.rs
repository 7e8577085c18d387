// Integration tests for the session's background loops
//
// The loops are driven with in-memory streams and channels, so no NATS
// server is needed.

use live_agent_voice::playback::MemorySink;
use live_agent_voice::session::{
    deliver_turns, pump_dialogue, ChatHistory, ConnectionStatus, Role,
};
use live_agent_voice::turn::{DialogueEvent, Fragment, TurnAccumulator};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

fn connected_history() -> Arc<Mutex<ChatHistory>> {
    let mut history = ChatHistory::new();
    history.status = ConnectionStatus::Connected;
    Arc::new(Mutex::new(history))
}

fn payloads(messages: &[&str]) -> futures::stream::Iter<std::vec::IntoIter<Vec<u8>>> {
    let owned: Vec<Vec<u8>> = messages.iter().map(|m| m.as_bytes().to_vec()).collect();
    futures::stream::iter(owned)
}

#[tokio::test]
async fn test_pump_forwards_events_in_order() {
    let history = connected_history();
    let (event_tx, mut event_rx) = mpsc::channel(16);

    pump_dialogue(
        payloads(&[
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":"Hello"}]}}}"#,
            "not json",
            r#"{"serverContent":{"modelTurn":{"parts":[{"text":" world"}]},"turnComplete":true}}"#,
        ]),
        event_tx,
        Arc::clone(&history),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            DialogueEvent::Fragment(Fragment::text("Hello")),
            DialogueEvent::Fragment(Fragment::text(" world")),
            DialogueEvent::TurnComplete,
        ]
    );
}

#[tokio::test]
async fn test_stream_end_while_running_disconnects() {
    let history = connected_history();
    history.lock().await.record_user("are you there?").unwrap();
    assert!(history.lock().await.is_processing);

    let (event_tx, _event_rx) = mpsc::channel(16);
    pump_dialogue(
        payloads(&[]),
        event_tx,
        Arc::clone(&history),
        Arc::new(AtomicBool::new(true)),
    )
    .await;

    let mut history = history.lock().await;
    assert_eq!(history.status, ConnectionStatus::Disconnected);
    assert!(!history.is_processing);
    assert!(history.record_user("hello again").is_none());
}

#[tokio::test]
async fn test_stream_end_after_stop_keeps_status() {
    let history = connected_history();
    history.lock().await.record_user("hi").unwrap();

    let (event_tx, _event_rx) = mpsc::channel(16);
    pump_dialogue(
        payloads(&[]),
        event_tx,
        Arc::clone(&history),
        Arc::new(AtomicBool::new(false)),
    )
    .await;

    let history = history.lock().await;
    assert_eq!(history.status, ConnectionStatus::Connected);
    assert!(history.is_processing);
}

#[tokio::test]
async fn test_turn_task_gone_marks_error() {
    let history = connected_history();
    let (event_tx, event_rx) = mpsc::channel(16);
    drop(event_rx);

    pump_dialogue(
        payloads(&[r#"{"serverContent":{"turnComplete":true}}"#]),
        event_tx,
        Arc::clone(&history),
        Arc::new(AtomicBool::new(true)),
    )
    .await;

    let history = history.lock().await;
    assert_eq!(history.status, ConnectionStatus::Error);
    assert!(!history.is_processing);
}

#[tokio::test]
async fn test_deliver_turns_updates_history_and_plays() {
    let history = connected_history();
    history.lock().await.record_user("What's on the menu?").unwrap();

    let sink = MemorySink::new();
    let (turn_tx, turn_rx) = mpsc::channel(4);

    let mut acc = TurnAccumulator::new();
    acc.on_fragment(Fragment::text("Dosa and chai."));
    acc.on_fragment(Fragment::audio("AAAA", None));
    turn_tx.send(acc.on_turn_complete()).await.unwrap();
    drop(turn_tx);

    deliver_turns(turn_rx, Arc::clone(&history), Arc::new(sink.clone())).await;

    let history = history.lock().await;
    assert!(!history.is_processing);
    assert_eq!(history.turns_completed(), 1);
    assert_eq!(history.latest_audio().map(|a| a.len()), Some(47));

    let messages = history.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Model);
    assert_eq!(messages[1].text, "Dosa and chai.");

    let played = sink.turns().await;
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].text, "Dosa and chai.");
}
