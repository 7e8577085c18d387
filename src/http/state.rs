use crate::session::{ChatSession, SessionConfig};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings every new session starts from
    pub session_template: Arc<SessionConfig>,

    /// The active chat session, if any
    pub session: Arc<RwLock<Option<Arc<ChatSession>>>>,
}

impl AppState {
    pub fn new(session_template: SessionConfig) -> Self {
        Self {
            session_template: Arc::new(session_template),
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn current(&self) -> Option<Arc<ChatSession>> {
        self.session.read().await.clone()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
