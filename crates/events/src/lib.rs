//! Airwatch live fan-out infrastructure.
//!
//! - [`BroadcastHub`]: holds live subscribers and pushes every published
//!   [`HubMessage`] to each of them without ever waiting on a slow one.
//! - [`HubMessage`]: the JSON envelope viewers receive.
//! - [`SnapshotProvider`]: supplies the full-state message a subscriber
//!   gets the moment it joins.

pub mod hub;
pub mod message;

pub use hub::{BroadcastHub, Frame, SnapshotProvider, SubscriberId, Subscription};
pub use message::HubMessage;
