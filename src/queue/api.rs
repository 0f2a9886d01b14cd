//! Public API for the queue system
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::queue::error::{QueueError, QueueResult};
pub use crate::queue::manager::{QueueManager, QueueOptions};
pub use crate::queue::types::{
    QueueEntry, QueueStatus, QueueUpdate, Registration, DEFAULT_MINUTES_PER_PERSON,
};
