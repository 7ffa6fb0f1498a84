//! WebSocket infrastructure for the progress push transport.
//!
//! Provides connection management with per-connection job
//! subscriptions, the HTTP upgrade handler, the bus-to-socket progress
//! forwarder, and heartbeat monitoring.

mod forwarder;
mod handler;
mod heartbeat;
pub mod manager;

pub use forwarder::start_progress_forwarder;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
