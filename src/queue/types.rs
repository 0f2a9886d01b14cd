//! Data types for the queue system
//!
//! Entries are created once per identity and never mutated. Updates and
//! statuses are computed views; neither is stored.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Default estimated service time per person ahead in the queue (minutes)
pub const DEFAULT_MINUTES_PER_PERSON: u64 = 2;

/// One registrant in the waiting line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Stable session identity of the registrant
    pub identity: String,
    /// Ticket number, 1-based in issuance order
    pub ticket_number: u64,
    /// When the ticket was issued
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(identity: String, ticket_number: u64) -> Self {
        Self {
            identity,
            ticket_number,
            joined_at: Utc::now(),
        }
    }
}

/// Outcome of a registration attempt
///
/// `is_new == false` means the identity was already queued and
/// `ticket_number` is its original ticket. That is a normal outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub ticket_number: u64,
    pub is_new: bool,
}

/// Aggregate queue counters pushed to subscribers
///
/// The `sequence` is assigned under the state lock and orders every
/// notification the relay carries. It never leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueUpdate {
    #[serde(skip)]
    pub sequence: u64,
    #[serde(rename = "total_in_queue")]
    pub total_registered: u64,
    #[serde(rename = "current_position")]
    pub head_position: u64,
    #[serde(rename = "current_number")]
    pub ticket_counter: u64,
}

/// Per-identity status view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub in_queue: bool,
    #[serde(rename = "queue_number", skip_serializing_if = "Option::is_none")]
    pub ticket_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    #[serde(rename = "total_in_queue")]
    pub total_registered: u64,
    #[serde(rename = "current_number", skip_serializing_if = "Option::is_none")]
    pub ticket_counter: Option<u64>,
    #[serde(rename = "estimated_time", skip_serializing_if = "Option::is_none")]
    pub estimated_wait: Option<u64>,
}

impl QueueStatus {
    /// Status for an identity that never registered
    pub fn not_queued(total_registered: u64, ticket_counter: u64) -> Self {
        Self {
            in_queue: false,
            ticket_number: None,
            position: None,
            total_registered,
            ticket_counter: Some(ticket_counter),
            estimated_wait: None,
        }
    }

    /// Status for a registered identity
    ///
    /// Position is the number of tickets still ahead of (and including)
    /// this one; it saturates at zero once the head has passed the ticket.
    pub fn queued(
        ticket_number: u64,
        head_position: u64,
        total_registered: u64,
        minutes_per_person: u64,
    ) -> Self {
        let position = ticket_number.saturating_sub(head_position);
        Self {
            in_queue: true,
            ticket_number: Some(ticket_number),
            position: Some(position),
            total_registered,
            ticket_counter: None,
            estimated_wait: Some(position.saturating_mul(minutes_per_person)),
        }
    }
}
