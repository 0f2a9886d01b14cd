//! Queue Error Types

use crate::notifications::api::NotificationError;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Identity missing: a non-empty session identity is required")]
    IdentityMissing,

    #[error("Subscription failed: {0}")]
    Subscription(#[from] NotificationError),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

impl crate::core::error_handling::ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, QueueError::IdentityMissing)
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            QueueError::IdentityMissing => Some("Session not found"),
            QueueError::Subscription(_) => None,
        }
    }
}
