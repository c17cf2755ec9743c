//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (SO_REUSEADDR bind, backlog, connection limits)
//!     → connection.rs (ID assignment, in-flight tracking)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Semaphore permits bound the number of connections handled at once
//! - Each connection tracked for graceful shutdown
//! - Plain TCP only

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{ConnectionPermit, Listener, ListenerError};
