use super::state::AppState;
use crate::store::{ClientMetadata, CloseStatus, NewSession, Speaker};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub model_name: String,
    pub user_id: String,

    /// Opaque per-device identifier
    pub client_identifier: String,

    /// Best-effort geolocation; absence never blocks creation
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub device_type: Option<String>,
    pub screen_res: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    pub id: String,

    /// Terminal status; defaults to completed
    pub status: Option<CloseStatus>,
}

#[derive(Debug, Serialize)]
pub struct CloseSessionResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub session_id: String,
    pub sender: Speaker,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AppendMessageResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /live/session
/// Create a session record at transport-open
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let new = NewSession {
        user_id: req.user_id,
        model_name: req.model_name,
        client: ClientMetadata {
            client_identifier: req.client_identifier,
            device_type: req.device_type.unwrap_or_else(|| "unknown".to_string()),
            screen_res: req.screen_res.unwrap_or_else(|| "unknown".to_string()),
            latitude: req.latitude,
            longitude: req.longitude,
        },
    };

    match state.store.create_session(new).await {
        Ok(id) => {
            info!("Session record created: {}", id);
            (StatusCode::OK, Json(CreateSessionResponse { id })).into_response()
        }
        Err(e) => {
            error!("Failed to create session: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// PUT /live/session
/// Close a session record with a terminal status
pub async fn close_session(
    State(state): State<AppState>,
    Json(req): Json<CloseSessionRequest>,
) -> impl IntoResponse {
    let status = req.status.unwrap_or(CloseStatus::Completed);

    match state.store.close_session(&req.id, status).await {
        Ok(()) => (StatusCode::OK, Json(CloseSessionResponse { success: true })).into_response(),
        Err(e) => {
            error!("Failed to close session {}: {:#}", req.id, e);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Session {} not found", req.id),
                }),
            )
                .into_response()
        }
    }
}

/// POST /live/message
/// Append one finalized transcript entry
pub async fn append_message(
    State(state): State<AppState>,
    Json(req): Json<AppendMessageRequest>,
) -> impl IntoResponse {
    // Safety check: empty entries are never persisted
    if req.session_id.is_empty() || req.text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing session_id or text".to_string(),
            }),
        )
            .into_response();
    }

    match state
        .store
        .append_message(&req.session_id, req.sender, &req.text)
        .await
    {
        Ok(id) => (StatusCode::OK, Json(AppendMessageResponse { id })).into_response(),
        Err(e) => {
            error!("Failed to append message: {:#}", e);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Session {} not found", req.session_id),
                }),
            )
                .into_response()
        }
    }
}

/// GET /live/sessions/user/:user_id
/// Session summaries for a user, most recent first
pub async fn user_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match state.store.sessions_for_user(&user_id).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => {
            error!("Failed to list sessions for {}: {:#}", user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to list sessions: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /live/sessions/:session_id
/// Full session view: metadata plus ordered messages
pub async fn session_detail(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.store.session_detail(&session_id).await {
        Ok(Some(detail)) => (StatusCode::OK, Json(detail)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to load session {}: {:#}", session_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to load session: {}", e),
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
