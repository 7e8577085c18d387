pub mod audio;
pub mod config;
pub mod http;
pub mod nats;
pub mod playback;
pub mod session;
pub mod turn;

pub use audio::{parse_format, synthesize, AudioFile, AudioFormat, WavBuffer, WavError};
pub use config::Config;
pub use http::{create_router, AppState};
pub use nats::{DialogueClient, ServerMessage, TranscriptMessage};
pub use playback::{FileSink, MemorySink, PlaybackSink};
pub use session::{
    deliver_turns, pump_dialogue, ChatMessage, ChatSession, ConnectionStatus, Role, SessionConfig,
    SessionStats,
};
pub use turn::{run_turns, DialogueEvent, Fragment, Turn, TurnAccumulator, TurnStats};
