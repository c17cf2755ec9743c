//! Origin server access.

pub mod client;

pub use client::{FetchResult, OriginClient, OriginError};
