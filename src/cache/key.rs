//! Cache key derivation from request paths.

use std::fmt;
use std::path::{Component, Path};

use crate::cache::error::{CacheError, CacheResult};

/// A request path normalized into a location relative to the cache root.
///
/// Leading and trailing slashes are stripped, repeated slashes collapse and
/// `.` segments are dropped, so every spelling of a file maps to one key.
/// Segment text, including any query string, is kept verbatim. Keys never
/// contain `..`, root or prefix components, so joining one onto the cache
/// root stays inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive a key from the path of an inbound request.
    pub fn from_request_path(path: &str) -> CacheResult<Self> {
        let stripped = path.trim_matches('/');
        if stripped.is_empty() {
            return Err(CacheError::EmptyKey(path.to_string()));
        }

        let mut segments = Vec::new();
        for component in Path::new(stripped).components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(CacheError::InvalidKey(path.to_string()));
                }
            }
        }
        if segments.is_empty() {
            return Err(CacheError::EmptyKey(path.to_string()));
        }

        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as a path relative to the cache root.
    pub fn relative_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_and_trailing_slashes() {
        let key = CacheKey::from_request_path("/a.txt").unwrap();
        assert_eq!(key.as_str(), "a.txt");

        let key = CacheKey::from_request_path("//docs/guide/").unwrap();
        assert_eq!(key.as_str(), "docs/guide");
        assert_eq!(key.relative_path(), Path::new("docs/guide"));
    }

    #[test]
    fn keeps_query_string() {
        let key = CacheKey::from_request_path("/search?q=rust").unwrap();
        assert_eq!(key.as_str(), "search?q=rust");
    }

    #[test]
    fn root_path_is_not_cacheable() {
        assert!(matches!(
            CacheKey::from_request_path("/"),
            Err(CacheError::EmptyKey(_))
        ));
        assert!(matches!(
            CacheKey::from_request_path("/./"),
            Err(CacheError::EmptyKey(_))
        ));
    }

    #[test]
    fn rejects_parent_segments() {
        for path in ["/../secret", "/a/../../b", "/..", "/a/.."] {
            assert!(
                matches!(CacheKey::from_request_path(path), Err(CacheError::InvalidKey(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn equivalent_spellings_share_a_key() {
        let plain = CacheKey::from_request_path("/a/b.txt").unwrap();
        for path in ["/a//b.txt", "/a/./b.txt", "//./a///b.txt/", "/./a/b.txt"] {
            assert_eq!(CacheKey::from_request_path(path).unwrap(), plain, "{path}");
        }
    }

    #[test]
    fn dotted_names_are_fine() {
        let key = CacheKey::from_request_path("/..hidden/file..txt").unwrap();
        assert_eq!(key.as_str(), "..hidden/file..txt");
    }
}
