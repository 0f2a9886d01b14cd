//! Protected queue state
//!
//! Everything in here lives behind the manager's single lock. The relay
//! worker shares the same lock to read and prune the subscriber set.

use crate::notifications::registry::SubscriberRegistry;
use crate::queue::types::{QueueEntry, QueueUpdate};
use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct QueueState {
    pub(crate) entries: HashMap<String, QueueEntry>,
    /// Last ticket issued, 0 when nobody registered yet
    pub(crate) ticket_counter: u64,
    /// Tickets at or below the head are served
    pub(crate) head_position: u64,
    /// Next relay sequence number
    next_sequence: u64,
    pub(crate) subscribers: SubscriberRegistry,
}

impl QueueState {
    pub(crate) fn new() -> Self {
        Self {
            next_sequence: 1,
            ..Default::default()
        }
    }

    pub(crate) fn total_registered(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Take a snapshot for the relay, consuming the next sequence number
    pub(crate) fn next_update(&mut self) -> QueueUpdate {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        QueueUpdate {
            sequence,
            total_registered: self.total_registered(),
            head_position: self.head_position,
            ticket_counter: self.ticket_counter,
        }
    }

    /// Read-only snapshot tagged with the last sequence handed out
    pub(crate) fn current_update(&self) -> QueueUpdate {
        QueueUpdate {
            sequence: self.next_sequence.saturating_sub(1),
            total_registered: self.total_registered(),
            head_position: self.head_position,
            ticket_counter: self.ticket_counter,
        }
    }
}
