//! Public API for the notification system
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::relay::RelayStatistics;
pub use crate::notifications::sink::ChannelSink;
pub use crate::notifications::subscriber::{SubscriberState, Subscription, SubscriptionHandle};
pub use crate::notifications::traits::{SnapshotSink, SubscriberStatistics};
