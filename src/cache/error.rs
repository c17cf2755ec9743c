//! Error types for cache operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the on-disk cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem read, write, rename or delete failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request path would resolve outside the cache root.
    #[error("path '{0}' escapes the cache root")]
    InvalidKey(String),

    /// Request path has nothing left once slashes are stripped.
    #[error("path '{0}' does not name a cacheable resource")]
    EmptyKey(String),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_path() {
        let err = CacheError::io(
            "Cache-X/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error on Cache-X/a.txt: denied");

        let err = CacheError::InvalidKey("/../etc/passwd".into());
        assert!(err.to_string().contains("escapes the cache root"));
    }
}
