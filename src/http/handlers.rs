use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use futures::Stream;
use serde::Serialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{error, info};

use super::state::AppState;
use crate::error::{StartError, UploadError};
use crate::session::{SessionState, SessionStatus};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartCaptureResponse {
    pub session_id: Option<String>,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopCaptureResponse {
    pub status: String,
    pub message: String,
    pub session: SessionStatus,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /capture/start
/// Start a capture session
pub async fn start_capture(State(state): State<AppState>) -> impl IntoResponse {
    if state.manager.state() != SessionState::Idle {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "A capture session is already running".to_string(),
            }),
        )
            .into_response();
    }

    if let Err(e) = state.manager.start().await {
        error!("Failed to start capture: {}", e);
        let code = match e {
            // Unreachable backend is the upstream's fault.
            StartError::Connect(_) => StatusCode::BAD_GATEWAY,
            StartError::Spawn(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        return (
            code,
            Json(ErrorResponse {
                error: format!("Failed to start capture: {}", e),
            }),
        )
            .into_response();
    }

    let status = state.manager.status().await;
    info!("Capture started: {:?}", status.session_id);

    (
        StatusCode::OK,
        Json(StartCaptureResponse {
            session_id: status.session_id,
            status: "recording".to_string(),
            message: "Capture started".to_string(),
        }),
    )
        .into_response()
}

/// POST /capture/stop
/// Stop the active capture session. Idempotent.
pub async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    state.manager.stop().await;
    let session = state.manager.status().await;

    (
        StatusCode::OK,
        Json(StopCaptureResponse {
            status: "stopped".to_string(),
            message: "Capture stopped".to_string(),
            session,
        }),
    )
}

/// GET /capture/replay
/// Raw audio of the most recent session
pub async fn get_replay(State(state): State<AppState>) -> impl IntoResponse {
    match state.manager.replay().await {
        Some(audio) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            audio,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No audio recorded".to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /capture/status
/// Session state snapshot
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.manager.status().await))
}

/// GET /capture/events
/// Server-sent update events, named after the presentation vocabulary
/// (transcript-update, summary-update, action-items-update, error).
pub async fn capture_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let updates = state.manager.subscribe();

    let stream = BroadcastStream::new(updates).filter_map(|update| match update {
        Ok(event) => Some(Ok(Event::default()
            .event(event.name())
            .data(event.payload().to_string()))),
        // A lagged subscriber skips ahead rather than ending the stream.
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            error!("Event subscriber lagged, {} updates dropped", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// POST /capture/analyze
/// One-shot analysis of a complete recording posted as the request body
pub async fn analyze_recording(
    State(state): State<AppState>,
    body: Bytes,
) -> impl IntoResponse {
    match state.uploader.upload(body.to_vec()).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(UploadError::NoAudio) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No audio data recorded".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Analysis upload failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Analysis failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
