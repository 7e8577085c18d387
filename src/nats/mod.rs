pub mod client;
pub mod messages;

pub use client::{DialogueClient, TRANSCRIPT_SUBJECT};
pub use messages::{
    ClientContent, ClientTurn, InlineData, ModelTurn, Part, ServerContent, ServerMessage,
    SessionSetup, TranscriptMessage,
};
