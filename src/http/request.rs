//! Inbound request parsing.
//!
//! Only the request line is read: `<METHOD> <PATH> [VERSION]`. Headers and
//! body are ignored.

use thiserror::Error;

/// Errors produced while parsing the request line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request line is empty")]
    EmptyRequestLine,

    #[error("request line '{0}' has no path")]
    MissingPath(String),
}

/// Result type for request parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Method and path from the first line of a raw request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: String,
    pub path: String,
}

impl InboundRequest {
    /// Parse the request line out of raw request bytes.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the method comparison
    /// downstream is exact, so mangled methods still end up as 405.
    pub fn parse(raw: &[u8]) -> ParseResult<Self> {
        let text = String::from_utf8_lossy(raw);
        let first_line = text.split("\r\n").next().unwrap_or_default();

        let mut tokens = first_line.split_whitespace();
        let method = tokens.next().ok_or(ParseError::EmptyRequestLine)?;
        let path = tokens
            .next()
            .ok_or_else(|| ParseError::MissingPath(first_line.to_string()))?;

        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
        })
    }

    /// Only an exact, case-sensitive `GET` is served.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}
