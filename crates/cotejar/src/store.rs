//! Snapshot and artifact storage.
//!
//! The comparator talks to durable storage through `SnapshotStore`, so the
//! filesystem backing can be swapped for an in-memory store in tests (or an
//! object store in CI) without touching the comparison logic.

use crate::result::{CotejarError, CotejarResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Path-addressed byte storage for baselines and failure artifacts.
///
/// `write` creates missing parent directories; `remove_tree` succeeds when
/// the tree is already absent.
pub trait SnapshotStore: Send + Sync {
    /// Read the bytes at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist or cannot be read.
    fn read(&self, path: &Path) -> CotejarResult<Vec<u8>>;

    /// Write `bytes` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn write(&self, path: &Path, bytes: &[u8]) -> CotejarResult<()>;

    /// Check whether `path` holds a file.
    fn exists(&self, path: &Path) -> bool;

    /// Recursively delete the tree rooted at `path`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing tree cannot be removed.
    fn remove_tree(&self, path: &Path) -> CotejarResult<()>;
}

/// Filesystem-backed store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    /// Create a filesystem store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SnapshotStore for FsStore {
    fn read(&self, path: &Path) -> CotejarResult<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> CotejarResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_tree(&self, path: &Path) -> CotejarResult<()> {
        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        Ok(())
    }
}

/// In-memory store keyed by path.
///
/// A directory "exists" whenever any stored path sits under it, which is all
/// the comparator needs; there is no separate directory entry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().map_or_else(
            |_| Vec::new(),
            |files| files.keys().cloned().collect(),
        )
    }

    /// Stored paths under `prefix`, sorted.
    #[must_use]
    pub fn paths_under(&self, prefix: &Path) -> Vec<PathBuf> {
        self.files.lock().map_or_else(
            |_| Vec::new(),
            |files| {
                files
                    .keys()
                    .filter(|p| p.starts_with(prefix))
                    .cloned()
                    .collect()
            },
        )
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, path: &Path) -> CotejarResult<Vec<u8>> {
        let files = self.files.lock().map_err(|_| CotejarError::NotFound {
            path: path.display().to_string(),
        })?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| CotejarError::NotFound {
                path: path.display().to_string(),
            })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> CotejarResult<()> {
        let mut files = self.files.lock().map_err(|_| CotejarError::NotFound {
            path: path.display().to_string(),
        })?;
        let _ = files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map_or(false, |files| files.contains_key(path))
    }

    fn remove_tree(&self, path: &Path) -> CotejarResult<()> {
        let mut files = self.files.lock().map_err(|_| CotejarError::NotFound {
            path: path.display().to_string(),
        })?;
        files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}
