//! Session management for logwire
//!
//! This crate gates the connection behind a local credential check, keeps
//! the optional remembered credential, and drives the session state machine
//! that ties the connection manager to the log buffer.

mod gate;
mod session;
mod store;

pub use gate::{AccessGate, CredentialInput, REMEMBER_KEY};
pub use session::{Notice, Session};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

// Re-export types used in our public API
pub use logwire_types::{Link, SessionState};
