use chrono::Utc;

use super::stats::{ChatMessage, ConnectionStatus, Role};
use crate::audio::WavBuffer;
use crate::turn::Turn;

/// Conversation state shown to the user: messages, status, processing flag
#[derive(Debug)]
pub struct ChatHistory {
    pub status: ConnectionStatus,
    pub is_processing: bool,
    messages: Vec<ChatMessage>,
    latest_audio: Option<WavBuffer>,
    turns_completed: usize,
    audio_failures: usize,
    next_id: u64,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            is_processing: false,
            messages: Vec::new(),
            latest_audio: None,
            turns_completed: 0,
            audio_failures: 0,
            next_id: 1,
        }
    }
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user transcript and mark the session as waiting on the model.
    /// Returns `None` when the transcript is empty or the session is not connected.
    pub fn record_user(&mut self, text: &str) -> Option<ChatMessage> {
        if text.is_empty() || self.status != ConnectionStatus::Connected {
            return None;
        }

        let message = self.push(Role::User, text.to_string());
        self.is_processing = true;
        Some(message)
    }

    /// Record a finished model turn and clear the processing flag
    pub fn complete_turn(&mut self, turn: &Turn) -> ChatMessage {
        let message = self.push(Role::Model, turn.text.clone());

        self.turns_completed += 1;
        if turn.audio_error.is_some() {
            self.audio_failures += 1;
        }
        if let Some(audio) = &turn.audio {
            self.latest_audio = Some(audio.clone());
        }
        self.is_processing = false;

        message
    }

    /// The dialogue stream is gone: stop accepting input and drop the
    /// processing flag, since no turn will ever complete it
    pub fn mark_closed(&mut self, status: ConnectionStatus) {
        self.status = status;
        self.is_processing = false;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn latest_audio(&self) -> Option<&WavBuffer> {
        self.latest_audio.as_ref()
    }

    pub fn turns_completed(&self) -> usize {
        self.turns_completed
    }

    pub fn audio_failures(&self) -> usize {
        self.audio_failures
    }

    fn push(&mut self, role: Role, text: String) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            role,
            text,
            timestamp: Utc::now(),
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}
