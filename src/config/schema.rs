//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the caching proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backlog, dispatch).
    pub listener: ListenerConfig,

    /// Origin server the proxy forwards cache misses to.
    pub origin: OriginConfig,

    /// On-disk cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Whether enough is configured to start a server.
    ///
    /// A port of 0 counts as unset, same as a missing origin.
    pub fn is_runnable(&self) -> bool {
        self.listener.port != 0 && !self.origin.base_url.trim().is_empty()
    }
}

/// How accepted connections are handed to the request handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One task per connection, bounded by `max_connections`.
    #[default]
    Concurrent,
    /// Fully handle each connection before accepting the next.
    Sequential,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. 0 means "not configured".
    pub port: u16,

    /// Pending-connection backlog passed to listen(2).
    pub backlog: u32,

    /// Maximum concurrently handled connections (backpressure).
    pub max_connections: usize,

    /// Connection dispatch strategy.
    pub dispatch: DispatchMode,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            backlog: 5,
            max_connections: 1024,
            dispatch: DispatchMode::Concurrent,
        }
    }
}

/// Origin server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL; the request path is appended verbatim.
    pub base_url: String,

    /// Upper bound on a single origin fetch, in seconds.
    pub timeout_secs: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl OriginConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Cache storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding cached bodies.
    pub root_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("Cache-X"),
        }
    }
}

/// Timeout configuration for connection handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long to wait for a client to send its request, in seconds.
    pub client_read_secs: u64,

    /// How long shutdown waits for in-flight connections, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_read_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn client_read(&self) -> Duration {
        Duration::from_secs(self.client_read_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_server() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.backlog, 5);
        assert_eq!(config.listener.dispatch, DispatchMode::Concurrent);
        assert_eq!(config.cache.root_dir, PathBuf::from("Cache-X"));
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn runnable_requires_port_and_origin() {
        let mut config = ProxyConfig::default();
        assert!(!config.is_runnable());

        config.listener.port = 8080;
        assert!(!config.is_runnable());

        config.origin.base_url = "http://example.test".into();
        assert!(config.is_runnable());

        config.listener.port = 0;
        assert!(!config.is_runnable());
    }
}
