//! Traits for the notification system

use crate::notifications::error::NotificationError;
use crate::queue::api::QueueUpdate;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Delivery statistics for one subscriber
pub struct SubscriberStatistics {
    delivered: AtomicUsize,
    evicted: AtomicBool,
    attached_at: Instant,
    last_delivery_time: RwLock<Option<Instant>>,
}

impl Default for SubscriberStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self {
            delivered: AtomicUsize::new(0),
            evicted: AtomicBool::new(false),
            attached_at: Instant::now(),
            last_delivery_time: RwLock::new(None),
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn record_delivery(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_delivery_time.write() {
            *time = Some(Instant::now());
        }
    }

    /// True once the relay removed this subscriber after a failed delivery
    pub fn is_evicted(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }

    pub(crate) fn record_eviction(&self) {
        self.evicted.store(true, Ordering::Release);
    }

    pub fn attached_at(&self) -> Instant {
        self.attached_at
    }

    pub fn last_delivery_time(&self) -> Option<Instant> {
        *self.last_delivery_time.read().ok()?
    }
}

/// Transport that can push a snapshot to one remote peer
///
/// `deliver` is called from the relay worker only, one update at a time and
/// in relay order. Returning an error evicts the subscriber; no further
/// updates are attempted for it.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Push one update to the peer
    async fn deliver(&self, update: &QueueUpdate) -> Result<(), NotificationError>;

    /// Label used in logs (peer address, test name, ...)
    fn source(&self) -> &str;

    /// Called once after the relay evicted this sink
    fn evicted(&self) {}
}
