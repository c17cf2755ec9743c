//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics endpoint when enabled
//! - Create the cache root and bind the listener
//! - Wire OS signals to graceful shutdown
//! - Run the accept loop until shutdown
//!
//! # Design Decisions
//! - Fail fast: cache root or bind errors are fatal
//! - A broken metrics endpoint is logged, not fatal
//! - Listener starts last (traffic only when ready)

use std::net::SocketAddr;

use crate::config::ProxyConfig;
use crate::http::{ProxyServer, ServerError};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::metrics;

/// Run the proxy until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), ServerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = ProxyServer::bind(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(server_shutdown).await
}
