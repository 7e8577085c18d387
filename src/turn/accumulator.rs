use tracing::{debug, warn};

use crate::audio::{synthesize, WavBuffer, DEFAULT_MIME_TYPE};

/// One base64-encoded slice of raw PCM from the dialogue stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub data: String,
    pub mime_type: Option<String>,
}

/// A partial model update: some text, one audio chunk, or both
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub text: Option<String>,
    pub chunk: Option<AudioChunk>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            chunk: None,
        }
    }

    pub fn audio(data: impl Into<String>, mime_type: Option<String>) -> Self {
        Self {
            text: None,
            chunk: Some(AudioChunk {
                data: data.into(),
                mime_type,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.chunk.is_none()
    }
}

/// In-order events delivered by the dialogue stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    Fragment(Fragment),
    TurnComplete,
}

/// A complete model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Ordered concatenation of every fragment's text (may be empty)
    pub text: String,
    /// Synthesized audio, present when the turn carried decodable chunks
    pub audio: Option<WavBuffer>,
    /// Why audio was dropped, if the chunks could not be synthesized
    pub audio_error: Option<String>,
}

/// Buffers fragments until the stream signals the end of a turn
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    text: String,
    chunks: Vec<String>,
    mime_type: Option<String>,
}

impl TurnAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_fragment(&mut self, fragment: Fragment) {
        if let Some(text) = fragment.text {
            self.text.push_str(&text);
        }

        if let Some(chunk) = fragment.chunk {
            if self.mime_type.is_none() {
                self.mime_type = chunk.mime_type;
            }
            self.chunks.push(chunk.data);
        }
    }

    /// Flush the buffered turn. Buffers are cleared even if synthesis fails;
    /// in that case the text is kept and the audio dropped.
    pub fn on_turn_complete(&mut self) -> Turn {
        let text = std::mem::take(&mut self.text);
        let chunks = std::mem::take(&mut self.chunks);
        let mime_type = self.mime_type.take();

        if chunks.is_empty() {
            debug!("Turn complete: {} chars, no audio", text.len());
            return Turn {
                text,
                audio: None,
                audio_error: None,
            };
        }

        let mime_type = mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);

        match synthesize(&chunks, mime_type) {
            Ok(wav) => {
                debug!(
                    "Turn complete: {} chars, {} chunks, {} WAV bytes ({})",
                    text.len(),
                    chunks.len(),
                    wav.len(),
                    mime_type
                );
                Turn {
                    text,
                    audio: Some(wav),
                    audio_error: None,
                }
            }
            Err(e) => {
                warn!("Dropping turn audio ({} chunks): {}", chunks.len(), e);
                Turn {
                    text,
                    audio: None,
                    audio_error: Some(e.to_string()),
                }
            }
        }
    }

    /// Apply one stream event, returning a turn on completion
    pub fn apply(&mut self, event: DialogueEvent) -> Option<Turn> {
        match event {
            DialogueEvent::Fragment(fragment) => {
                self.on_fragment(fragment);
                None
            }
            DialogueEvent::TurnComplete => Some(self.on_turn_complete()),
        }
    }

    /// Discard anything buffered for the current turn
    pub fn reset(&mut self) {
        self.text.clear();
        self.chunks.clear();
        self.mime_type = None;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.chunks.is_empty()
    }

    pub fn pending_text(&self) -> &str {
        &self.text
    }

    pub fn pending_chunks(&self) -> usize {
        self.chunks.len()
    }
}
