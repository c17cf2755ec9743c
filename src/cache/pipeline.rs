//! Fetch pipeline: cache lookup, origin fetch on miss, store.
//!
//! Every failure in here is recovered locally. A cache read error is a miss,
//! an origin error is "not found", a cache write error is logged and the
//! freshly fetched body is still returned.

use bytes::Bytes;

use crate::cache::error::CacheError;
use crate::cache::key::CacheKey;
use crate::cache::store::CacheStore;
use crate::observability::metrics::{self, Lookup};
use crate::origin::OriginClient;

/// How a request path was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the cache.
    Cached(Bytes),
    /// Fetched from the origin on a miss.
    Fetched(Bytes),
    /// Neither the cache nor the origin had it.
    NotFound,
}

impl Resolution {
    pub fn is_hit(&self) -> bool {
        matches!(self, Resolution::Cached(_))
    }

    pub fn into_body(self) -> Option<Bytes> {
        match self {
            Resolution::Cached(body) | Resolution::Fetched(body) => Some(body),
            Resolution::NotFound => None,
        }
    }
}

/// Resolves request paths against the cache and the origin.
#[derive(Debug, Clone)]
pub struct FetchPipeline {
    store: CacheStore,
    origin: OriginClient,
}

impl FetchPipeline {
    pub fn new(store: CacheStore, origin: OriginClient) -> Self {
        Self { store, origin }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn origin(&self) -> &OriginClient {
        &self.origin
    }

    /// Resolve `path` to a body.
    pub async fn fetch(&self, path: &str) -> Resolution {
        let key = match CacheKey::from_request_path(path) {
            Ok(key) => key,
            Err(e) => {
                if matches!(e, CacheError::InvalidKey(_)) {
                    tracing::warn!(path = %path, error = %e, "Refusing to cache path");
                } else {
                    tracing::debug!(path = %path, "Path not cacheable");
                }
                metrics::record_cache_lookup(Lookup::Bypass);
                return match self.fetch_origin(path).await {
                    Some(body) => Resolution::Fetched(body),
                    None => Resolution::NotFound,
                };
            }
        };

        match self.store.get(&key).await {
            Ok(Some(body)) => {
                tracing::info!(path = %path, key = %key, cache = "HIT", "Cache hit");
                metrics::record_cache_lookup(Lookup::Hit);
                return Resolution::Cached(body);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Cache read failed, treating as miss");
            }
        }

        tracing::info!(path = %path, key = %key, cache = "MISS", "Cache miss");
        metrics::record_cache_lookup(Lookup::Miss);

        let Some(body) = self.fetch_origin(path).await else {
            return Resolution::NotFound;
        };

        match self.store.put(&key, &body).await {
            Ok(written) => {
                tracing::info!(path = %path, file = %written.display(), "Saved to cache");
                metrics::record_cache_write(true);
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Error saving to cache");
                metrics::record_cache_write(false);
            }
        }

        Resolution::Fetched(body)
    }

    async fn fetch_origin(&self, path: &str) -> Option<Bytes> {
        match self.origin.fetch(path).await {
            Ok(body) => {
                metrics::record_origin_fetch(true);
                Some(body)
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Error fetching from origin");
                metrics::record_origin_fetch(false);
                None
            }
        }
    }
}
