//! Loops run by a chat session's background tasks

use super::history::ChatHistory;
use super::stats::ConnectionStatus;
use crate::nats::ServerMessage;
use crate::playback::PlaybackSink;
use crate::turn::{DialogueEvent, Turn};
use futures::stream::{Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

/// Parse dialogue payloads and forward their events in order.
///
/// If the stream ends while the session is still running (the server closed
/// the subject or the connection dropped), the session is marked
/// `Disconnected`. If the turn task went away, it is marked `Error`.
pub async fn pump_dialogue<S, P>(
    mut payloads: S,
    event_tx: mpsc::Sender<DialogueEvent>,
    history: Arc<Mutex<ChatHistory>>,
    is_running: Arc<AtomicBool>,
) where
    S: Stream<Item = P> + Unpin,
    P: AsRef<[u8]>,
{
    info!("Dialogue listener task started");

    let mut end_status = ConnectionStatus::Disconnected;

    'messages: while let Some(payload) = payloads.next().await {
        let message = match serde_json::from_slice::<ServerMessage>(payload.as_ref()) {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed to parse dialogue message: {}", e);
                continue;
            }
        };

        for event in message.into_events() {
            if event_tx.send(event).await.is_err() {
                error!("Turn task gone, stopping dialogue listener");
                end_status = ConnectionStatus::Error;
                break 'messages;
            }
        }
    }

    if is_running.load(Ordering::SeqCst) {
        warn!("Dialogue stream ended unexpectedly, session is now {:?}", end_status);
        let mut history = history.lock().await;
        history.mark_closed(end_status);
    }

    info!("Dialogue listener task stopped");
}

/// Hand each finished turn to the history, then to the playback sink
pub async fn deliver_turns(
    mut turn_rx: mpsc::Receiver<Turn>,
    history: Arc<Mutex<ChatHistory>>,
    sink: Arc<dyn PlaybackSink>,
) {
    info!("Turn delivery task started ({} sink)", sink.name());

    while let Some(turn) = turn_rx.recv().await {
        {
            let mut history = history.lock().await;
            history.complete_turn(&turn);
        }

        if let Err(e) = sink.play(&turn).await {
            error!("Audio playback failed: {:#}", e);
        }
    }

    info!("Turn delivery task stopped");
}
