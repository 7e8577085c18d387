use super::state::AppState;
use crate::session::{ChatMessage, ChatSession, SessionConfig, SessionStats};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Optional voice override
    pub voice_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
    pub stats: SessionStats,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub accepted: bool,
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn no_session() -> Response {
    error_response(StatusCode::NOT_FOUND, "No active session".to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Open the chat session
pub async fn start_session(
    State(state): State<AppState>,
    req: Option<Json<StartSessionRequest>>,
) -> impl IntoResponse {
    let req = req.map(|Json(r)| r).unwrap_or_default();

    if let Some(conflict) = live_session_conflict(state.current().await).await {
        return conflict;
    }

    let template: &SessionConfig = &state.session_template;
    let config = SessionConfig {
        session_id: req
            .session_id
            .unwrap_or_else(|| format!("chat-{}", uuid::Uuid::new_v4())),
        voice_name: req
            .voice_name
            .unwrap_or_else(|| template.voice_name.clone()),
        ..template.clone()
    };
    let session_id = config.session_id.clone();

    info!("Starting chat session: {}", session_id);

    // Connecting and opening happen without holding the state lock
    let session = match ChatSession::new(config).await {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to create session: {:#}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create session: {}", e),
            );
        }
    };
    let started = session.start().await;

    let replaced = {
        let mut current = state.session.write().await;
        if let Some(conflict) = live_session_conflict(current.as_ref().cloned()).await {
            drop(current);
            if let Err(e) = session.stop().await {
                warn!("Failed to stop superseded session {}: {:#}", session_id, e);
            }
            return conflict;
        }
        // A session that failed to open is kept so its Error status stays visible
        current.replace(Arc::clone(&session))
    };

    if let Some(old) = replaced {
        info!("Replacing closed session {}", old.session_id());
        if let Err(e) = old.stop().await {
            warn!("Failed to stop previous session: {:#}", e);
        }
    }

    if let Err(e) = started {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to start session: {}", e),
        );
    }

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id: session_id.clone(),
            status: "connected".to_string(),
            message: format!("Session {} started", session_id),
        }),
    )
        .into_response()
}

/// CONFLICT response if `session` is still connecting or connected.
/// Closed or failed sessions may be replaced.
async fn live_session_conflict(session: Option<Arc<ChatSession>>) -> Option<Response> {
    let session = session?;
    if !session.get_stats().await.status.is_live() {
        return None;
    }

    Some(error_response(
        StatusCode::CONFLICT,
        format!("Session {} is already active", session.session_id()),
    ))
}

/// POST /session/stop
/// Close the active session
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.write().await.take();

    let Some(session) = session else {
        return no_session();
    };

    match session.stop().await {
        Ok(stats) => {
            info!("Session {} stopped", session.session_id());
            (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id: session.session_id().to_string(),
                    status: "disconnected".to_string(),
                    message: "Session stopped".to_string(),
                    stats,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to stop session: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to stop session: {}", e),
            )
        }
    }
}

/// GET /session/status
pub async fn get_session_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.current().await {
        Some(session) => (StatusCode::OK, Json(session.get_stats().await)).into_response(),
        None => no_session(),
    }
}

/// GET /session/messages
/// Conversation history so far
pub async fn get_session_messages(State(state): State<AppState>) -> impl IntoResponse {
    match state.current().await {
        Some(session) => (StatusCode::OK, Json(session.get_messages().await)).into_response(),
        None => no_session(),
    }
}

/// POST /session/transcript
/// Submit typed text in place of a speech transcript
pub async fn submit_transcript(
    State(state): State<AppState>,
    Json(req): Json<TranscriptRequest>,
) -> impl IntoResponse {
    let Some(session) = state.current().await else {
        return no_session();
    };

    match session.submit_transcript(&req.text).await {
        Ok(message) => (
            StatusCode::OK,
            Json(TranscriptResponse {
                accepted: message.is_some(),
                message,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to submit transcript: {:#}", e);
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Failed to submit transcript: {}", e),
            )
        }
    }
}

/// GET /session/audio/latest
/// WAV of the most recent model turn
pub async fn get_latest_audio(State(state): State<AppState>) -> impl IntoResponse {
    let Some(session) = state.current().await else {
        return no_session();
    };

    match session.latest_audio().await {
        Some(wav) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/wav")],
            wav.into_bytes(),
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No audio yet".to_string()),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
