//! QueueManager - Central coordination for the waiting line
//!
//! Every operation runs under one exclusive lock covering the whole
//! read-modify-notify sequence, so callers observe a linearizable history.
//! Notifications are stamped with a sequence number and handed to the
//! broadcast relay while the lock is still held.

use crate::notifications::api::{RelayStatistics, SnapshotSink, SubscriptionHandle};
use crate::notifications::relay::{self, BroadcastRelay, RelayMessage, RelayPermit};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::state::QueueState;
use crate::queue::types::{
    QueueEntry, QueueStatus, QueueUpdate, Registration, DEFAULT_MINUTES_PER_PERSON,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tunables for a queue manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    /// Relay channel capacity; `None` for unbounded
    pub relay_capacity: Option<usize>,
    /// Minutes of estimated wait per person ahead
    pub minutes_per_person: u64,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            relay_capacity: None,
            minutes_per_person: DEFAULT_MINUTES_PER_PERSON,
        }
    }
}

/// Owner of the queue state and producer side of the broadcast relay
///
/// # Thread Safety
///
/// Share it with `Arc<QueueManager>`. The relay worker is spawned on
/// creation and stops once the manager is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use waitline::queue::api::QueueManager;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = QueueManager::create();
///
/// let registration = manager.register("session-1").await?;
/// println!("ticket {}", registration.ticket_number);
///
/// let head = manager.advance_head().await;
/// let status = manager.status("session-1").await;
/// println!("head {head}, position {:?}", status.position);
/// # Ok(())
/// # }
/// ```
pub struct QueueManager {
    state: Arc<Mutex<QueueState>>,
    relay: relay::RelaySender,
    relay_statistics: Arc<RelayStatistics>,
    minutes_per_person: u64,
}

impl QueueManager {
    /// Create a manager with default options and start its relay
    ///
    /// Must be called from within a tokio runtime.
    pub fn create() -> Arc<Self> {
        Self::with_options(QueueOptions::default())
    }

    pub fn with_options(options: QueueOptions) -> Arc<Self> {
        let state = Arc::new(Mutex::new(QueueState::new()));
        let relay_statistics = Arc::new(RelayStatistics::default());
        let (sender, receiver) = relay::channel(options.relay_capacity);

        BroadcastRelay::new(receiver, state.clone(), relay_statistics.clone()).spawn();

        log::debug!(
            "Queue manager created (relay capacity: {}, minutes per person: {})",
            options
                .relay_capacity
                .map_or_else(|| "unbounded".to_string(), |c| c.to_string()),
            options.minutes_per_person
        );

        Arc::new(Self {
            state,
            relay: sender,
            relay_statistics,
            minutes_per_person: options.minutes_per_person,
        })
    }

    /// Register an identity, or return its existing ticket
    pub async fn register(&self, identity: &str) -> QueueResult<Registration> {
        if identity.is_empty() {
            return Err(QueueError::IdentityMissing);
        }

        let permit = self.reserve_notification().await;
        let mut state = self.state.lock().await;

        if let Some(entry) = state.entries.get(identity) {
            return Ok(Registration {
                ticket_number: entry.ticket_number,
                is_new: false,
            });
        }

        state.ticket_counter += 1;
        let ticket_number = state.ticket_counter;
        state.entries.insert(
            identity.to_string(),
            QueueEntry::new(identity.to_string(), ticket_number),
        );

        let update = state.next_update();
        Self::notify(permit, RelayMessage::Broadcast(update));
        log::debug!(
            "Issued ticket {} ({} registered)",
            ticket_number,
            update.total_registered
        );

        Ok(Registration {
            ticket_number,
            is_new: true,
        })
    }

    /// Serve one more ticket and return the new head position
    ///
    /// There is no upper bound: the head may pass the last issued ticket.
    pub async fn advance_head(&self) -> u64 {
        let permit = self.reserve_notification().await;
        let mut state = self.state.lock().await;

        state.head_position += 1;
        let update = state.next_update();
        Self::notify(permit, RelayMessage::Broadcast(update));
        log::debug!(
            "Queue head advanced to {} (last ticket {})",
            update.head_position,
            update.ticket_counter
        );

        update.head_position
    }

    /// Status of one identity; never triggers a notification
    pub async fn status(&self, identity: &str) -> QueueStatus {
        let state = self.state.lock().await;
        match state.entries.get(identity) {
            Some(entry) => QueueStatus::queued(
                entry.ticket_number,
                state.head_position,
                state.total_registered(),
                self.minutes_per_person,
            ),
            None => QueueStatus::not_queued(state.total_registered(), state.ticket_counter),
        }
    }

    /// Current aggregate counters
    pub async fn snapshot(&self) -> QueueUpdate {
        self.state.lock().await.current_update()
    }

    /// Look up the entry for an identity
    pub async fn entry(&self, identity: &str) -> Option<QueueEntry> {
        self.state.lock().await.entries.get(identity).cloned()
    }

    /// Register a sink and queue the current state for it alone
    ///
    /// The synthetic snapshot goes through the relay, so it reaches the sink
    /// before any update produced after this call.
    pub async fn attach(&self, sink: Arc<dyn SnapshotSink>) -> QueueResult<SubscriptionHandle> {
        let permit = self.relay.reserve().await?;
        let mut state = self.state.lock().await;

        let update = state.next_update();
        let source = sink.source().to_string();
        let (subscriber_id, statistics) = state.subscribers.insert(sink, update.sequence);
        permit.send(RelayMessage::Direct {
            subscriber_id,
            update,
        });

        log::debug!(
            "Subscriber {} attached ({}), {} active",
            subscriber_id,
            source,
            state.subscribers.len()
        );

        Ok(SubscriptionHandle::new(subscriber_id, statistics))
    }

    /// Remove a subscriber; false when it was already gone
    pub async fn detach(&self, handle: &SubscriptionHandle) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.subscribers.remove(handle.id());
        if removed {
            log::debug!(
                "Subscriber {} detached, {} active",
                handle.id(),
                state.subscribers.len()
            );
        }
        removed
    }

    pub async fn is_attached(&self, handle: &SubscriptionHandle) -> bool {
        self.state.lock().await.subscribers.contains(handle.id())
    }

    pub async fn subscriber_count(&self) -> usize {
        self.state.lock().await.subscribers.len()
    }

    pub fn relay_statistics(&self) -> &RelayStatistics {
        &self.relay_statistics
    }

    pub fn minutes_per_person(&self) -> u64 {
        self.minutes_per_person
    }

    async fn reserve_notification(&self) -> Option<RelayPermit<'_>> {
        match self.relay.reserve().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                log::warn!("State change will not be broadcast: {}", e);
                None
            }
        }
    }

    fn notify(permit: Option<RelayPermit<'_>>, message: RelayMessage) {
        if let Some(permit) = permit {
            permit.send(message);
        }
    }
}

impl std::fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueManager")
            .field("minutes_per_person", &self.minutes_per_person)
            .field("relay_statistics", &self.relay_statistics)
            .finish_non_exhaustive()
    }
}
