//! Proxy server: accept loop and dispatch.
//!
//! # Responsibilities
//! - Build the cache store, origin client and fetch pipeline from config
//! - Bind the listener
//! - Accept connections and hand each to the request handler
//! - Stop on shutdown and drain in-flight connections

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::cache::{CacheError, CacheStore, FetchPipeline};
use crate::config::{DispatchMode, ProxyConfig};
use crate::http::handler::RequestHandler;
use crate::net::{ConnectionTracker, Listener, ListenerError};
use crate::origin::{OriginClient, OriginError};

/// Fatal server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("cache root unavailable: {0}")]
    CacheRoot(#[from] CacheError),

    #[error(transparent)]
    Origin(#[from] OriginError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// First pause after a failed accept; doubles per consecutive failure.
const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(100);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// What the accept loop does after `accept` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptRecovery {
    /// Transient failure (e.g. out of file descriptors); wait, then accept again.
    Retry(Duration),
    /// The listener can no longer produce connections.
    Stop,
}

fn recover_from_accept_error(error: &ListenerError, consecutive: u32) -> AcceptRecovery {
    match error {
        ListenerError::Accept(_) => {
            let shift = consecutive.saturating_sub(1).min(4);
            let delay = ACCEPT_BACKOFF_MIN.saturating_mul(1 << shift);
            AcceptRecovery::Retry(delay.min(ACCEPT_BACKOFF_MAX))
        }
        ListenerError::Closed | ListenerError::Bind { .. } => AcceptRecovery::Stop,
    }
}

/// The caching proxy server.
pub struct ProxyServer {
    listener: Listener,
    handler: RequestHandler,
    tracker: ConnectionTracker,
    config: ProxyConfig,
}

impl ProxyServer {
    /// Prepare the cache root and bind the listener.
    pub async fn bind(config: ProxyConfig) -> Result<Self, ServerError> {
        let store = CacheStore::new(&config.cache.root_dir);
        store.ensure_root().await?;

        let origin = OriginClient::new(&config.origin)?;
        let pipeline = FetchPipeline::new(store, origin);
        let handler = RequestHandler::new(pipeline, config.timeouts.client_read());

        let listener = Listener::bind(&config.listener).await?;

        Ok(Self {
            listener,
            handler,
            tracker: ConnectionTracker::new(),
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Accept and serve connections until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.handler.pipeline().origin().base_url(),
            cache_root = %self.config.cache.root_dir.display(),
            dispatch = ?self.config.listener.dispatch,
            "Cache proxy is listening on port {}, forwarding to {}",
            addr.port(),
            self.config.origin.base_url
        );

        let mut accept_failures: u32 = 0;
        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer, permit) = match accepted {
                Ok(conn) => {
                    accept_failures = 0;
                    conn
                }
                Err(e) => {
                    accept_failures = accept_failures.saturating_add(1);
                    match recover_from_accept_error(&e, accept_failures) {
                        AcceptRecovery::Stop => {
                            tracing::error!(error = %e, "Listener unusable, no longer accepting");
                            break;
                        }
                        AcceptRecovery::Retry(delay) => {
                            tracing::warn!(
                                error = %e,
                                consecutive_failures = accept_failures,
                                retry_in_ms = delay.as_millis() as u64,
                                "Accept failed"
                            );
                            tokio::select! {
                                _ = shutdown.recv() => {
                                    tracing::info!("Shutdown signal received, no longer accepting");
                                    break;
                                }
                                _ = tokio::time::sleep(delay) => continue,
                            }
                        }
                    }
                }
            };

            let guard = self.tracker.track();
            let connection_id = guard.id();
            let span = tracing::info_span!("connection", id = %connection_id, peer = %peer);

            match self.config.listener.dispatch {
                DispatchMode::Concurrent => {
                    let handler = self.handler.clone();
                    tokio::spawn(
                        async move {
                            let _permit = permit;
                            let _guard = guard;
                            handler.handle(stream, connection_id).await;
                        }
                        .instrument(span),
                    );
                }
                DispatchMode::Sequential => {
                    self.handler
                        .handle(stream, connection_id)
                        .instrument(span)
                        .await;
                    drop(guard);
                    drop(permit);
                }
            }
        }

        let grace = self.config.timeouts.shutdown_grace();
        if !self.tracker.wait_for_drain(grace).await {
            tracing::warn!(
                remaining = self.tracker.active_count(),
                grace_secs = grace.as_secs(),
                "Shutdown grace period elapsed with connections still open"
            );
        }

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emfile() -> ListenerError {
        ListenerError::Accept(std::io::Error::from_raw_os_error(24))
    }

    #[test]
    fn accept_failure_waits_before_retrying() {
        assert_eq!(
            recover_from_accept_error(&emfile(), 1),
            AcceptRecovery::Retry(Duration::from_millis(100))
        );
        assert_eq!(
            recover_from_accept_error(&emfile(), 3),
            AcceptRecovery::Retry(Duration::from_millis(400))
        );
    }

    #[test]
    fn accept_backoff_is_capped() {
        for consecutive in [5, 6, 50, u32::MAX] {
            assert_eq!(
                recover_from_accept_error(&emfile(), consecutive),
                AcceptRecovery::Retry(ACCEPT_BACKOFF_MAX)
            );
        }
    }

    #[test]
    fn accept_retry_rate_is_bounded() {
        // Ten straight failures cannot fit in under a second of waiting.
        let waited: Duration = (1..=10)
            .map(|n| match recover_from_accept_error(&emfile(), n) {
                AcceptRecovery::Retry(delay) => delay,
                AcceptRecovery::Stop => panic!("accept errors are retried"),
            })
            .sum();
        assert!(waited >= Duration::from_secs(5), "waited {waited:?}");
    }

    #[test]
    fn closed_limiter_stops_the_loop() {
        assert_eq!(
            recover_from_accept_error(&ListenerError::Closed, 1),
            AcceptRecovery::Stop
        );
    }
}
