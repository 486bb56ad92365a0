//! Connection manager for logwire
//!
//! This crate speaks Engine.IO v4 / Socket.IO v5 to a log source over a
//! WebSocket or long-polling transport and reports connectivity changes and
//! received log events to its owner.

mod config;
pub mod engineio;
mod error;
mod manager;
pub mod socketio;
#[cfg(test)]
mod test_server;
mod transport;

pub use config::{ReconnectPolicy, TransportConfig};
pub use error::{PacketError, TransportError};
pub use manager::{Connection, ConnectionManager, LinkStatus};

// Re-export types that are used in our public API
pub use logwire_types::{ConnectionEvent, TransportKind};
pub use reqwest::Url;
