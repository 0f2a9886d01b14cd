//! Real-time queue notifications
//!
//! State changes reach subscribers through a single broadcast relay:
//!
//! ```text
//!  register / advance_head / attach
//!            │ (under the state lock, sequence-stamped)
//!            ▼
//!  ┌───────────────────────┐
//!  │   relay channel (FIFO) │
//!  └───────────┬───────────┘
//!              ▼
//!      BroadcastRelay worker ──► copy targets under lock
//!              │
//!      ┌───────┼────────┐
//!      ▼       ▼        ▼
//!    sink A  sink B   sink C   (failed sink => evicted)
//! ```

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod registry;
pub(crate) mod relay;
pub(crate) mod sink;
pub(crate) mod subscriber;
pub(crate) mod traits;

// Public API module - the only public interface for the notification system
pub mod api;
