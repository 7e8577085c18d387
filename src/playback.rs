//! Playback collaborators that receive finished turns

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::turn::Turn;

/// Receives each completed turn with its synthesized audio
#[async_trait::async_trait]
pub trait PlaybackSink: Send + Sync {
    /// Handle one turn. Turns without audio are delivered too.
    async fn play(&self, turn: &Turn) -> Result<()>;

    /// Sink name for logging
    fn name(&self) -> &str;
}

/// Writes each turn's audio to `<prefix>-turn-NNN.wav`
pub struct FileSink {
    output_dir: PathBuf,
    prefix: String,
    next_index: Mutex<usize>,
}

impl FileSink {
    pub fn new(output_dir: PathBuf, prefix: String) -> Result<Self> {
        fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

        info!("File sink writing to {}", output_dir.display());

        Ok(Self {
            output_dir,
            prefix,
            next_index: Mutex::new(0),
        })
    }

    pub fn turn_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}-turn-{:03}.wav", self.prefix, index))
    }
}

#[async_trait::async_trait]
impl PlaybackSink for FileSink {
    async fn play(&self, turn: &Turn) -> Result<()> {
        let mut index = self.next_index.lock().await;
        let turn_index = *index;
        *index += 1;

        let Some(audio) = &turn.audio else {
            return Ok(());
        };

        let path = self.turn_path(turn_index);
        tokio::fs::write(&path, audio.as_bytes())
            .await
            .with_context(|| format!("Failed to write WAV file: {:?}", path))?;

        info!(
            "Wrote turn {} audio: {:?} ({:.2}s)",
            turn_index,
            path,
            audio.duration_secs()
        );

        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Keeps every delivered turn in memory
#[derive(Clone, Default)]
pub struct MemorySink {
    turns: Arc<Mutex<Vec<Turn>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn turns(&self) -> Vec<Turn> {
        self.turns.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl PlaybackSink for MemorySink {
    async fn play(&self, turn: &Turn) -> Result<()> {
        self.turns.lock().await.push(turn.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
