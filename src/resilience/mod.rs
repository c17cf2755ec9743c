//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Origin fetch / client read:
//!     → timeouts.rs (enforce deadline)
//!     → On expiry: caller maps Elapsed into its own error type
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - No retries: a failed origin fetch is reported as not found

pub mod timeouts;

pub use timeouts::{with_timeout, Elapsed};
