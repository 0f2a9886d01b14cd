//! Channel-backed snapshot sink
//!
//! Bridges the relay to a transport task: the relay pushes into an
//! unbounded channel and the transport drains it at its own pace. When the
//! transport drops its receiver the next delivery fails and the relay
//! evicts the subscriber.

use crate::notifications::error::NotificationError;
use crate::notifications::traits::SnapshotSink;
use crate::queue::api::QueueUpdate;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

pub struct ChannelSink {
    source: String,
    sender: mpsc::UnboundedSender<QueueUpdate>,
    evicted: Arc<Notify>,
}

impl ChannelSink {
    pub fn new(source: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<QueueUpdate>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let sink = Self {
            source: source.into(),
            sender,
            evicted: Arc::new(Notify::new()),
        };
        (sink, receiver)
    }

    /// Fires once the relay has given up on this sink
    pub fn eviction_signal(&self) -> Arc<Notify> {
        self.evicted.clone()
    }
}

#[async_trait]
impl SnapshotSink for ChannelSink {
    async fn deliver(&self, update: &QueueUpdate) -> Result<(), NotificationError> {
        self.sender
            .send(*update)
            .map_err(|_| NotificationError::SubscriberUnreachable(self.source.clone()))
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn evicted(&self) {
        self.evicted.notify_one();
    }
}
