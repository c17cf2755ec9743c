//! Outbound responses.
//!
//! The proxy speaks a fixed set of literal HTTP/1.1 responses: status line,
//! blank line, optional body. No headers are sent, including
//! `Content-Length`; clients rely on the connection closing to find the end
//! of the body.

use bytes::{BufMut, Bytes, BytesMut};

/// Body sent with every 404.
pub const NOT_FOUND_BODY: &str = "File Not Found";

/// The statuses the proxy ever answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
        }
    }

    pub fn status_line(self) -> &'static str {
        match self {
            Status::Ok => "HTTP/1.1 200 OK",
            Status::NotFound => "HTTP/1.1 404 NOT FOUND",
            Status::MethodNotAllowed => "HTTP/1.1 405 Method Not Allowed",
            Status::InternalServerError => "HTTP/1.1 500 Internal Server Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status: Status,
    pub body: Option<Bytes>,
}

impl OutboundResponse {
    pub fn ok(body: Bytes) -> Self {
        Self {
            status: Status::Ok,
            body: Some(body),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            body: Some(Bytes::from_static(NOT_FOUND_BODY.as_bytes())),
        }
    }

    pub fn method_not_allowed() -> Self {
        Self {
            status: Status::MethodNotAllowed,
            body: None,
        }
    }

    pub fn internal_error() -> Self {
        Self {
            status: Status::InternalServerError,
            body: None,
        }
    }

    /// Wire bytes for this response.
    pub fn to_bytes(&self) -> Bytes {
        let line = self.status.status_line();
        let body_len = self.body.as_ref().map_or(0, Bytes::len);

        let mut buf = BytesMut::with_capacity(line.len() + 4 + body_len);
        buf.put_slice(line.as_bytes());
        buf.put_slice(b"\r\n\r\n");
        if let Some(body) = &self.body {
            buf.put_slice(body);
        }
        buf.freeze()
    }
}
