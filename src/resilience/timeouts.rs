//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap origin fetches and client reads with a deadline
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - A timed-out origin fetch is an unavailable resource (404), never a 500

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The wrapped operation did not finish within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {}ms", .0.as_millis())]
pub struct Elapsed(pub Duration);

/// Run `fut` with a deadline of `limit`.
pub async fn with_timeout<F, T>(limit: Duration, fut: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Elapsed(limit))
}
