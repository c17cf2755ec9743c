//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → CLI flag overrides
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::CacheConfig;
pub use schema::DispatchMode;
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::OriginConfig;
pub use schema::ProxyConfig;
pub use schema::TimeoutConfig;
