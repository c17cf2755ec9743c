//! On-disk response cache.
//!
//! # Data Flow
//! ```text
//! request path
//!     → key.rs (strip slashes, reject traversal)
//!     → store.rs (file under the cache root)
//!     → pipeline.rs (hit → body; miss → origin → store → body)
//! ```
//!
//! # Design Decisions
//! - One file per key, path mirrors the request path
//! - No TTL, no eviction; only an explicit clear removes entries
//! - Clear removes direct children of the root only

pub mod error;
pub mod key;
pub mod pipeline;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use key::CacheKey;
pub use pipeline::{FetchPipeline, Resolution};
pub use store::{CacheStore, ClearReport};
