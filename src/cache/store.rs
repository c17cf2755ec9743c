//! Filesystem-backed cache store.
//!
//! Each entry is a plain file under the cache root whose relative path is the
//! entry's [`CacheKey`]. Writes go through a per-key async mutex and land via
//! temp file + rename, so concurrent readers never see a partial body and
//! readers never block on writers.

use bytes::Bytes;
use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cache::error::{CacheError, CacheResult};
use crate::cache::key::CacheKey;

/// Shared handle to the on-disk cache. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    root: PathBuf,
    write_locks: DashMap<CacheKey, Arc<Mutex<()>>>,
}

/// Outcome of [`CacheStore::clear_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Cache root that was cleared.
    pub root: PathBuf,
    /// False when the root did not exist and nothing was touched.
    pub root_existed: bool,
    /// Files deleted.
    pub removed: Vec<PathBuf>,
    /// Files that could not be deleted.
    pub failed: Vec<PathBuf>,
}

impl CacheStore {
    /// Create a store rooted at `root`. Nothing is touched on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                root: root.into(),
                write_locks: DashMap::new(),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Location of `key` on disk.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.inner.root.join(key.relative_path())
    }

    /// Create the cache root and any missing parents.
    pub async fn ensure_root(&self) -> CacheResult<()> {
        tokio::fs::create_dir_all(self.root())
            .await
            .map_err(|e| CacheError::io(self.root(), e))
    }

    /// Read the stored body for `key`, or `None` if nothing is stored.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    /// Store `body` under `key`, replacing any previous entry.
    ///
    /// Returns the path written.
    pub async fn put(&self, key: &CacheKey, body: &[u8]) -> CacheResult<PathBuf> {
        let path = self.path_for(key);
        let lock = self.lock_for(key);

        let result = {
            let _guard = lock.lock().await;
            write_atomic(&path, body).await
        };

        drop(lock);
        self.inner
            .write_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);

        result.map(|()| path)
    }

    /// Delete every regular file directly under the cache root.
    ///
    /// Subdirectories and their contents are left alone. A missing root is
    /// reported, not treated as an error.
    pub async fn clear_all(&self) -> CacheResult<ClearReport> {
        let root = self.root();
        let mut report = ClearReport {
            root: root.to_path_buf(),
            ..ClearReport::default()
        };

        match tokio::fs::metadata(root).await {
            Ok(meta) if meta.is_dir() => report.root_existed = true,
            Ok(_) => {
                return Err(CacheError::io(
                    root,
                    std::io::Error::other("cache root is not a directory"),
                ));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(root = %root.display(), "Cache directory does not exist");
                return Ok(report);
            }
            Err(e) => return Err(CacheError::io(root, e)),
        }

        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| CacheError::io(root, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::io(root, e))?
        {
            let path = entry.path();
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to stat cache entry");
                    report.failed.push(path);
                    continue;
                }
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Deleted cached file");
                    report.removed.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete cached file");
                    report.failed.push(path);
                }
            }
        }

        tracing::info!(
            root = %root.display(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Cache cleared"
        );
        Ok(report)
    }

    fn lock_for(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        self.inner
            .write_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

async fn write_atomic(path: &Path, body: &[u8]) -> CacheResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CacheError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = tokio::fs::write(&temp_path, body).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(CacheError::io(temp_path, e));
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(CacheError::io(path, e));
    }

    Ok(())
}

/// Unique sibling of `path`, so the final rename never crosses filesystems.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
}
