//! Chat session management
//!
//! This module provides the `ChatSession` abstraction that manages:
//! - Session setup on the dialogue stream
//! - Forwarding finalized speech transcripts as user turns
//! - Turn reassembly and WAV synthesis of model replies
//! - Conversation history and connection status

mod config;
mod history;
mod session;
mod stats;
mod tasks;

pub use config::SessionConfig;
pub use history::ChatHistory;
pub use session::ChatSession;
pub use stats::{ChatMessage, ConnectionStatus, Role, SessionStats};
pub use tasks::{deliver_turns, pump_dialogue};
