//! WebSocket transport for the broadcast hub.
//!
//! Provides the HTTP upgrade handler used by Axum routes and the heartbeat
//! task that keeps idle connections alive.

mod handler;
mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
