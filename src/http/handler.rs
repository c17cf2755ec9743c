//! Per-connection request handling.
//!
//! # Responsibilities
//! - Read one request off the connection
//! - Reject anything but GET
//! - Resolve the path through the fetch pipeline
//! - Write exactly one literal response, then close
//!
//! The connection is moved into [`RequestHandler::handle`] and dropped when it
//! returns, so it is closed exactly once on every path. Stage errors bubble up
//! as [`HandlerError`] to a single boundary that answers 500.

use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::cache::FetchPipeline;
use crate::http::request::{InboundRequest, ParseError};
use crate::http::response::OutboundResponse;
use crate::net::connection::ConnectionId;
use crate::observability::metrics;
use crate::resilience::with_timeout;

/// Bytes read from the client; only the request line matters.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Failures that end up as a 500.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct RequestHandler {
    pipeline: FetchPipeline,
    read_timeout: Duration,
}

impl RequestHandler {
    pub fn new(pipeline: FetchPipeline, read_timeout: Duration) -> Self {
        Self {
            pipeline,
            read_timeout,
        }
    }

    pub fn pipeline(&self) -> &FetchPipeline {
        &self.pipeline
    }

    /// Serve one connection to completion and close it.
    pub async fn handle<S>(&self, mut stream: S, connection_id: ConnectionId)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let response = match self.respond(&mut stream, connection_id).await {
            Ok(Some(response)) => response,
            Ok(None) => {
                let _ = stream.shutdown().await;
                return;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "Error handling client request");
                OutboundResponse::internal_error()
            }
        };

        metrics::record_response(response.status.code());
        if let Err(e) = stream.write_all(&response.to_bytes()).await {
            tracing::warn!(connection_id = %connection_id, error = %e, "Failed to write response");
        }
        let _ = stream.shutdown().await;
    }

    /// `Ok(None)` means the client went away without sending anything.
    async fn respond<S>(
        &self,
        stream: &mut S,
        connection_id: ConnectionId,
    ) -> Result<Option<OutboundResponse>, HandlerError>
    where
        S: AsyncRead + Unpin,
    {
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let n = match with_timeout(self.read_timeout, stream.read(&mut buf)).await {
            Ok(read) => read?,
            Err(elapsed) => {
                tracing::debug!(connection_id = %connection_id, error = %elapsed, "Client sent nothing, dropping");
                return Ok(None);
            }
        };
        if n == 0 {
            tracing::debug!(connection_id = %connection_id, "Empty connection");
            return Ok(None);
        }

        let request = InboundRequest::parse(&buf[..n])?;
        tracing::debug!(
            connection_id = %connection_id,
            method = %request.method,
            path = %request.path,
            "Request received"
        );

        if !request.is_get() {
            return Ok(Some(OutboundResponse::method_not_allowed()));
        }

        let response = match self.pipeline.fetch(&request.path).await.into_body() {
            Some(body) => OutboundResponse::ok(body),
            None => OutboundResponse::not_found(),
        };
        Ok(Some(response))
    }
}
