use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;

/// Configuration for a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "chat-5f0c...")
    pub session_id: String,

    /// NATS server URL
    pub nats_url: String,

    /// Dialogue model name
    pub model: String,

    /// Prebuilt voice used for spoken replies
    pub voice_name: String,

    /// System prompt sent with the session setup
    pub system_instruction: String,

    /// Where turn audio is written, if anywhere
    pub output_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("chat-{}", uuid::Uuid::new_v4()),
            nats_url: "nats://localhost:4222".to_string(),
            model: "models/gemini-2.5-flash-preview-native-audio-dialog".to_string(),
            voice_name: "Zephyr".to_string(),
            system_instruction: String::new(),
            output_dir: None,
        }
    }
}

impl SessionConfig {
    /// Session settings taken from the application config
    pub fn from_app_config(cfg: &Config) -> Self {
        Self {
            nats_url: cfg.dialogue.nats_url.clone(),
            model: cfg.dialogue.model.clone(),
            voice_name: cfg.dialogue.voice_name.clone(),
            system_instruction: cfg.dialogue.system_instruction.clone(),
            output_dir: Some(PathBuf::from(&cfg.audio.output_dir)),
            ..Self::default()
        }
    }
}
