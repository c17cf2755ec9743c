//! Caching forward proxy.
//!
//! Serves HTTP GET requests from an on-disk cache, fetching misses from a
//! configured origin server and storing them for next time.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::listener ──▶ http::server ──▶ http::handler
//!                                                       │
//!                                                       ▼
//!                                              cache::pipeline
//!                                              │             │
//!                                              ▼             ▼
//!                                       cache::store   origin::client ──▶ Origin
//!                                       (Cache-X/…)
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod origin;
pub mod resilience;

pub use cache::{CacheStore, FetchPipeline, Resolution};
pub use config::ProxyConfig;
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
