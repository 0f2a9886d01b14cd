//! HTTP error responses

use crate::core::error_handling::ContextualError;
use crate::queue::api::QueueError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Already in queue with ticket {ticket_number}")]
    AlreadyQueued { ticket_number: u64 },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AlreadyQueued { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Queue(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::AlreadyQueued { ticket_number } => json!({
                "error": "Already in queue",
                "queue_number": ticket_number,
            }),
            ApiError::RateLimited => json!({
                "error": "Rate limit exceeded, please try again later",
            }),
            ApiError::Queue(err) => {
                if !err.is_user_actionable() {
                    log::error!("Queue operation failed: {err}");
                }
                json!({ "error": err.user_message().unwrap_or("Internal server error") })
            }
            ApiError::Internal(detail) => {
                log::error!("{detail}");
                json!({ "error": "Internal server error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
