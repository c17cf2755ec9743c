//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, dispatch)
//!     → handler.rs (read, method check, pipeline, single 500 boundary)
//!     → request.rs (request line parsing)
//!     → response.rs (literal status line + body)
//!     → connection closed
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{HandlerError, RequestHandler};
pub use request::{InboundRequest, ParseError, ParseResult};
pub use response::{OutboundResponse, Status};
pub use server::{ProxyServer, ServerError};
