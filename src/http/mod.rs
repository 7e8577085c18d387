//! HTTP API for the chat front end
//!
//! - POST /session/start - Open the chat session
//! - POST /session/stop - Close it
//! - POST /session/transcript - Submit typed text as a user turn
//! - GET /session/status - Connection status and processing flag
//! - GET /session/messages - Conversation history
//! - GET /session/audio/latest - WAV of the latest model turn
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
