use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::accumulator::{DialogueEvent, Turn, TurnAccumulator};

/// Summary of a finished turn-processing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnStats {
    /// Turns emitted
    pub turns: usize,
    /// Turns that carried audio
    pub turns_with_audio: usize,
    /// Turns whose audio could not be synthesized
    pub audio_failures: usize,
    /// Whether the stream closed mid-turn (buffered state discarded)
    pub discarded_partial: bool,
}

/// Drive a [`TurnAccumulator`] from an ordered event channel.
///
/// Completed turns are forwarded to `turn_tx`. Runs until `event_rx` closes;
/// a turn still in progress at that point is discarded.
pub async fn run_turns(
    mut event_rx: mpsc::Receiver<DialogueEvent>,
    turn_tx: mpsc::Sender<Turn>,
) -> Result<TurnStats> {
    let mut accumulator = TurnAccumulator::new();
    let mut stats = TurnStats::default();

    info!("Turn processing started");

    while let Some(event) = event_rx.recv().await {
        let Some(turn) = accumulator.apply(event) else {
            continue;
        };

        stats.turns += 1;
        if turn.audio.is_some() {
            stats.turns_with_audio += 1;
        }
        if turn.audio_error.is_some() {
            stats.audio_failures += 1;
        }

        info!(
            "Turn {} complete: {} chars, audio={}",
            stats.turns,
            turn.text.len(),
            turn.audio.as_ref().map(|a| a.len()).unwrap_or(0)
        );

        if turn_tx.send(turn).await.is_err() {
            warn!("Turn receiver dropped, stopping turn processing");
            break;
        }
    }

    if !accumulator.is_empty() {
        warn!(
            "Dialogue stream closed mid-turn, discarding {} chars and {} chunks",
            accumulator.pending_text().len(),
            accumulator.pending_chunks()
        );
        stats.discarded_partial = true;
        accumulator.reset();
    }

    info!("Turn processing stopped: {} turns", stats.turns);

    Ok(stats)
}
