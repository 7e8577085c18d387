use serde::{Deserialize, Serialize};

use crate::turn::{AudioChunk, DialogueEvent, Fragment};

/// Message received from the hosted dialogue model
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_content: Option<ServerContent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_turn: Option<ModelTurn>,
    #[serde(default)]
    pub turn_complete: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub data: String,  // Base64-encoded PCM bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ServerMessage {
    /// Split into stream events: the fragment carried by the first model-turn
    /// part (if any), then `TurnComplete` if the message closes the turn.
    pub fn into_events(self) -> Vec<DialogueEvent> {
        let mut events = Vec::new();
        let Some(content) = self.server_content else {
            return events;
        };

        let first_part = content
            .model_turn
            .and_then(|turn| turn.parts.into_iter().next());

        if let Some(part) = first_part {
            let fragment = Fragment {
                text: part.text.filter(|t| !t.is_empty()),
                chunk: part
                    .inline_data
                    .filter(|d| !d.data.is_empty())
                    .map(|d| AudioChunk {
                        data: d.data,
                        mime_type: d.mime_type,
                    }),
            };
            if !fragment.is_empty() {
                events.push(DialogueEvent::Fragment(fragment));
            }
        }

        if content.turn_complete {
            events.push(DialogueEvent::TurnComplete);
        }

        events
    }
}

/// A user turn submitted to the dialogue model
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientContent {
    pub session_id: String,
    pub turns: Vec<ClientTurn>,
    pub timestamp: String,  // RFC3339 timestamp
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientTurn {
    pub text: String,
}

/// Model configuration published when a session opens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSetup {
    pub session_id: String,
    pub model: String,
    pub response_modalities: Vec<String>,
    pub voice_name: String,
    pub system_instruction: String,
}

/// Transcript message received from the speech-recognition service
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub session_id: String,
    pub text: String,
    pub partial: bool,
    pub timestamp: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl TranscriptMessage {
    /// Whether this is a finished utterance addressed to `session_id`
    pub fn is_final_for(&self, session_id: &str) -> bool {
        !self.partial && self.session_id == session_id
    }
}
