//! Subscriber registry
//!
//! Owned by the queue state and therefore guarded by the same lock as the
//! counters. The relay never delivers while holding that lock: it takes a
//! copy of the targets with [`SubscriberRegistry::targets`] and releases it.

use crate::notifications::traits::{SnapshotSink, SubscriberStatistics};
use std::collections::HashMap;
use std::sync::Arc;

struct SubscriberInfo {
    sink: Arc<dyn SnapshotSink>,
    /// Sequence of the synthetic snapshot queued on attach; broadcasts
    /// older than this predate the subscriber and are skipped
    joined_at_sequence: u64,
    statistics: Arc<SubscriberStatistics>,
}

/// A delivery target copied out of the registry
#[derive(Clone)]
pub(crate) struct DeliveryTarget {
    pub(crate) subscriber_id: u64,
    pub(crate) sink: Arc<dyn SnapshotSink>,
    pub(crate) statistics: Arc<SubscriberStatistics>,
}

#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: u64,
    subscribers: HashMap<u64, SubscriberInfo>,
}

impl SubscriberRegistry {
    pub(crate) fn insert(
        &mut self,
        sink: Arc<dyn SnapshotSink>,
        joined_at_sequence: u64,
    ) -> (u64, Arc<SubscriberStatistics>) {
        self.next_id += 1;
        let subscriber_id = self.next_id;
        let statistics = Arc::new(SubscriberStatistics::new());

        self.subscribers.insert(
            subscriber_id,
            SubscriberInfo {
                sink,
                joined_at_sequence,
                statistics: statistics.clone(),
            },
        );

        (subscriber_id, statistics)
    }

    /// Remove a subscriber; returns false when it was already gone
    pub(crate) fn remove(&mut self, subscriber_id: u64) -> bool {
        self.subscribers.remove(&subscriber_id).is_some()
    }

    pub(crate) fn contains(&self, subscriber_id: u64) -> bool {
        self.subscribers.contains_key(&subscriber_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Subscribers that should receive a broadcast with this sequence
    pub(crate) fn targets(&self, sequence: u64) -> Vec<DeliveryTarget> {
        self.subscribers
            .iter()
            .filter(|(_, info)| info.joined_at_sequence <= sequence)
            .map(|(id, info)| DeliveryTarget {
                subscriber_id: *id,
                sink: info.sink.clone(),
                statistics: info.statistics.clone(),
            })
            .collect()
    }

    /// The single subscriber a direct snapshot is addressed to
    pub(crate) fn target(&self, subscriber_id: u64) -> Option<DeliveryTarget> {
        self.subscribers
            .get(&subscriber_id)
            .map(|info| DeliveryTarget {
                subscriber_id,
                sink: info.sink.clone(),
                statistics: info.statistics.clone(),
            })
    }
}
