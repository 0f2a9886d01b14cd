//! Error types for the notification system

use crate::notifications::subscriber::SubscriberState;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationError {
    /// The sink could not take the update; the peer is gone
    SubscriberUnreachable(String),
    /// The relay worker has stopped and no longer accepts snapshots
    RelayClosed,
    /// A lifecycle transition was requested from the wrong state
    InvalidTransition {
        from: SubscriberState,
        action: &'static str,
    },
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::SubscriberUnreachable(source) => {
                write!(f, "Subscriber unreachable: {source}")
            }
            NotificationError::RelayClosed => {
                write!(f, "Broadcast relay is no longer running")
            }
            NotificationError::InvalidTransition { from, action } => {
                write!(f, "Cannot {action} a subscriber in state {from:?}")
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl crate::core::error_handling::ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        false // All notification errors are system-level
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
