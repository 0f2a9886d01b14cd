//! Subscriber lifecycle
//!
//! A [`Subscription`] walks `Connecting -> Active -> Closed`. Activation
//! attaches the sink to the queue manager, which queues one current-state
//! snapshot for it. Closing detaches it exactly once, whichever side
//! noticed the connection was gone first.

use crate::notifications::error::NotificationError;
use crate::notifications::traits::{SnapshotSink, SubscriberStatistics};
use crate::queue::api::{QueueManager, QueueResult};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Connecting,
    Active,
    Closed,
}

/// Identifies one attached subscriber; pass it back to detach
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: u64,
    statistics: Arc<SubscriberStatistics>,
}

impl SubscriptionHandle {
    pub(crate) fn new(id: u64, statistics: Arc<SubscriberStatistics>) -> Self {
        Self { id, statistics }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn statistics(&self) -> &SubscriberStatistics {
        &self.statistics
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("delivered", &self.statistics.delivered())
            .finish()
    }
}

/// One live notification channel and its lifecycle state
pub struct Subscription {
    manager: Arc<QueueManager>,
    handle: Option<SubscriptionHandle>,
    state: SubscriberState,
}

impl Subscription {
    pub fn new(manager: Arc<QueueManager>) -> Self {
        Self {
            manager,
            handle: None,
            state: SubscriberState::Connecting,
        }
    }

    /// Current lifecycle state
    ///
    /// A subscription the relay evicted after a failed delivery reads as
    /// `Closed` even before the transport notices.
    pub fn state(&self) -> SubscriberState {
        match &self.handle {
            Some(handle) if handle.statistics().is_evicted() => SubscriberState::Closed,
            _ => self.state,
        }
    }

    pub fn handle(&self) -> Option<&SubscriptionHandle> {
        self.handle.as_ref()
    }

    /// Complete the handshake: register the sink and go `Active`
    ///
    /// A failed attach closes the subscription.
    pub async fn activate(&mut self, sink: Arc<dyn SnapshotSink>) -> QueueResult<SubscriptionHandle> {
        if self.state != SubscriberState::Connecting {
            return Err(NotificationError::InvalidTransition {
                from: self.state,
                action: "activate",
            }
            .into());
        }

        match self.manager.attach(sink).await {
            Ok(handle) => {
                self.state = SubscriberState::Active;
                self.handle = Some(handle.clone());
                Ok(handle)
            }
            Err(e) => {
                self.state = SubscriberState::Closed;
                Err(e)
            }
        }
    }

    /// Move to `Closed`, detaching from the manager if still registered
    ///
    /// Returns true only when this call removed the subscriber. Closing
    /// twice, or after the relay already evicted it, is a no-op.
    pub async fn close(&mut self) -> bool {
        if self.state == SubscriberState::Closed {
            return false;
        }
        self.state = SubscriberState::Closed;

        match self.handle.take() {
            Some(handle) => self.manager.detach(&handle).await,
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Detach when dropped without an explicit close (e.g. task aborted)
        if let Some(handle) = self.handle.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                let manager = self.manager.clone();
                runtime.spawn(async move {
                    manager.detach(&handle).await;
                });
            }
        }
    }
}
