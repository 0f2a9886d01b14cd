//! Broadcast relay
//!
//! A single worker drains the relay channel strictly in push order. For each
//! message it copies the delivery targets under the state lock, releases the
//! lock and delivers to each target in turn. A failed delivery evicts that
//! subscriber only; the remaining targets and the producers never see it.

use crate::notifications::error::NotificationError;
use crate::notifications::registry::DeliveryTarget;
use crate::queue::api::QueueUpdate;
use crate::queue::state::QueueState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// A notification waiting in the relay channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelayMessage {
    /// Fan out to every subscriber attached before this update was taken
    Broadcast(QueueUpdate),
    /// Synthetic current-state snapshot for one newly attached subscriber
    Direct {
        subscriber_id: u64,
        update: QueueUpdate,
    },
}

/// Producer side of the relay channel
pub(crate) enum RelaySender {
    Unbounded(mpsc::UnboundedSender<RelayMessage>),
    Bounded(mpsc::Sender<RelayMessage>),
}

/// A reserved slot in the relay channel
///
/// Slots are reserved before the state lock is taken and filled while it is
/// held, so channel order always matches sequence order and a full channel
/// never blocks the relay worker from taking the lock.
pub(crate) enum RelayPermit<'a> {
    Unbounded(&'a mpsc::UnboundedSender<RelayMessage>),
    Bounded(mpsc::Permit<'a, RelayMessage>),
}

pub(crate) enum RelayReceiver {
    Unbounded(mpsc::UnboundedReceiver<RelayMessage>),
    Bounded(mpsc::Receiver<RelayMessage>),
}

/// Create the relay channel; `None` means unbounded
pub(crate) fn channel(capacity: Option<usize>) -> (RelaySender, RelayReceiver) {
    match capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (RelaySender::Bounded(tx), RelayReceiver::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (RelaySender::Unbounded(tx), RelayReceiver::Unbounded(rx))
        }
    }
}

impl RelaySender {
    /// Reserve room for one message, waiting if a bounded channel is full
    pub(crate) async fn reserve(&self) -> Result<RelayPermit<'_>, NotificationError> {
        match self {
            RelaySender::Unbounded(tx) => {
                if tx.is_closed() {
                    Err(NotificationError::RelayClosed)
                } else {
                    Ok(RelayPermit::Unbounded(tx))
                }
            }
            RelaySender::Bounded(tx) => tx
                .reserve()
                .await
                .map(RelayPermit::Bounded)
                .map_err(|_| NotificationError::RelayClosed),
        }
    }
}

impl RelayPermit<'_> {
    pub(crate) fn send(self, message: RelayMessage) {
        match self {
            RelayPermit::Unbounded(tx) => {
                if tx.send(message).is_err() {
                    log::warn!("Broadcast relay stopped; dropping {:?}", message);
                }
            }
            RelayPermit::Bounded(permit) => permit.send(message),
        }
    }
}

impl RelayReceiver {
    async fn recv(&mut self) -> Option<RelayMessage> {
        match self {
            RelayReceiver::Unbounded(rx) => rx.recv().await,
            RelayReceiver::Bounded(rx) => rx.recv().await,
        }
    }
}

/// Counters describing the relay's work so far
#[derive(Debug, Default)]
pub struct RelayStatistics {
    snapshots_relayed: AtomicU64,
    deliveries: AtomicU64,
    evictions: AtomicU64,
}

impl RelayStatistics {
    /// Messages taken off the relay channel
    pub fn snapshots_relayed(&self) -> u64 {
        self.snapshots_relayed.load(Ordering::Relaxed)
    }

    /// Successful per-subscriber deliveries
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    /// Subscribers removed after a failed delivery
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

pub(crate) struct BroadcastRelay {
    receiver: RelayReceiver,
    state: Arc<Mutex<QueueState>>,
    statistics: Arc<RelayStatistics>,
}

impl BroadcastRelay {
    pub(crate) fn new(
        receiver: RelayReceiver,
        state: Arc<Mutex<QueueState>>,
        statistics: Arc<RelayStatistics>,
    ) -> Self {
        Self {
            receiver,
            state,
            statistics,
        }
    }

    /// Run the worker until every producer is gone
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        log::debug!("Broadcast relay started");
        while let Some(message) = self.receiver.recv().await {
            self.relay(message).await;
        }
        log::debug!("Broadcast relay stopped: no producers left");
    }

    async fn relay(&self, message: RelayMessage) {
        let (update, targets) = {
            let state = self.state.lock().await;
            match message {
                RelayMessage::Broadcast(update) => {
                    (update, state.subscribers.targets(update.sequence))
                }
                RelayMessage::Direct {
                    subscriber_id,
                    update,
                } => (
                    update,
                    state.subscribers.target(subscriber_id).into_iter().collect(),
                ),
            }
        };
        self.statistics
            .snapshots_relayed
            .fetch_add(1, Ordering::Relaxed);

        log::trace!(
            "Relaying update #{} to {} subscriber(s)",
            update.sequence,
            targets.len()
        );

        for target in targets {
            match target.sink.deliver(&update).await {
                Ok(()) => {
                    target.statistics.record_delivery();
                    self.statistics.deliveries.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => self.evict(&target, e).await,
            }
        }
    }

    async fn evict(&self, target: &DeliveryTarget, error: NotificationError) {
        let removed = {
            let mut state = self.state.lock().await;
            state.subscribers.remove(target.subscriber_id)
        };

        if removed {
            target.statistics.record_eviction();
            self.statistics.evictions.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "Removing subscriber {} ({}) after failed delivery: {}",
                target.subscriber_id,
                target.sink.source(),
                error
            );
            target.sink.evicted();
        }
    }
}
