//! Waiting-line queue state
//!
//! The queue hands out tickets in strictly increasing order and tracks a
//! head position; tickets at or below the head count as served. Nothing is
//! ever removed: a session that registered stays registered for the life of
//! the process.
//!
//! # Overview
//!
//! - **Register**: first call for an identity issues the next ticket, later
//!   calls return the same ticket with `is_new == false`
//! - **Advance**: moves the head forward by one, unconditionally
//! - **Status**: position `max(ticket - head, 0)` and an estimated wait
//! - **Subscribe**: sinks attached to the manager receive every state change
//!   through the broadcast relay (see [`crate::notifications`])
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use waitline::queue::api::QueueManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = QueueManager::create();
//!
//! for identity in ["u1", "u2", "u3"] {
//!     manager.register(identity).await?;
//! }
//! assert_eq!(manager.status("u2").await.position, Some(2));
//!
//! manager.advance_head().await;
//! assert_eq!(manager.status("u2").await.position, Some(1));
//! # Ok(())
//! # }
//! ```

pub(crate) mod error;
pub(crate) mod manager;
pub(crate) mod state;
pub(crate) mod types;

pub mod api;

#[cfg(test)]
mod tests;
