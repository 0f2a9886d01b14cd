//! Queue endpoints

use crate::queue::api::QueueStatus;
use crate::server::error::ApiError;
use crate::server::session::Session;
use crate::server::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub success: bool,
    pub queue_number: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceResponse {
    pub success: bool,
    pub current_position: u64,
}

/// `GET /api/queue/status`
pub async fn queue_status(
    State(state): State<AppState>,
    Session(identity): Session,
) -> Json<QueueStatus> {
    Json(state.manager.status(&identity).await)
}

/// `POST /api/queue/join`
pub async fn join_queue(
    State(state): State<AppState>,
    Session(identity): Session,
) -> Result<Json<JoinResponse>, ApiError> {
    let registration = state.manager.register(&identity).await?;
    if !registration.is_new {
        return Err(ApiError::AlreadyQueued {
            ticket_number: registration.ticket_number,
        });
    }

    log::info!(
        "Session {identity} joined the queue with ticket {}",
        registration.ticket_number
    );
    Ok(Json(JoinResponse {
        success: true,
        queue_number: registration.ticket_number,
        message: "You have joined the queue".to_string(),
    }))
}

/// `POST /api/queue/advance`
///
/// Unauthenticated: any caller may move the head.
pub async fn advance_queue(State(state): State<AppState>) -> Json<AdvanceResponse> {
    let head = state.manager.advance_head().await;
    log::info!("Queue advanced to {head}");
    Json(AdvanceResponse {
        success: true,
        current_position: head,
    })
}
