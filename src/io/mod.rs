//! Byte storage abstraction.
//!
//! The engine never touches the filesystem directly; everything goes through
//! [`ByteStore`], so embedders can supply cloud or in-memory backends. The
//! crate ships [`FsStore`] for the local filesystem and [`MemoryStore`] for
//! tests and embedding.
//!
//! [`TempFiles`] tracks intermediate files produced during a merge (today:
//! version-downgraded copies of incompatible inputs) and deletes them when it
//! goes out of scope, whether the merge succeeded or not.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{MergeError, Result};

/// Byte-level storage operations the merge pipeline needs.
pub trait ByteStore: Send + Sync {
    /// Read the full contents at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::FileNotFound`] when the path does not exist and
    /// [`MergeError::Io`] for any other failure.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write `bytes` to `path`, replacing any existing content.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Whether `path` currently exists in the store.
    fn exists(&self, path: &Path) -> bool;

    /// Remove `path`. Removing a missing path is not an error.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Create the directory `path` (and parents) if needed.
    fn ensure_dir(&self, path: &Path) -> Result<()>;
}

/// [`ByteStore`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl ByteStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => MergeError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => MergeError::io(path, err),
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::write(path, bytes).map_err(|err| MergeError::io(path, err))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn delete(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MergeError::io(path, err)),
        }
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|err| MergeError::io(path, err))
    }
}

/// In-memory [`ByteStore`] for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently held.
    pub fn len(&self) -> usize {
        self.files.lock().expect("store lock").len()
    }

    /// Whether the store holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .expect("store lock")
            .get(path)
            .cloned()
            .ok_or_else(|| MergeError::FileNotFound {
                path: path.to_path_buf(),
            })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files
            .lock()
            .expect("store lock")
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("store lock").contains_key(path)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.files.lock().expect("store lock").remove(path);
        Ok(())
    }

    fn ensure_dir(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Scoped set of intermediate files, removed on drop.
pub struct TempFiles {
    store: Arc<dyn ByteStore>,
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl TempFiles {
    /// Create a temp-file set rooted at `dir`, creating the directory if
    /// needed.
    pub fn new(store: Arc<dyn ByteStore>, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        store.ensure_dir(&dir)?;
        Ok(Self {
            store,
            dir,
            files: Vec::new(),
        })
    }

    /// Directory intermediate files are placed in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a fresh path under the temp directory and register it for
    /// cleanup. The file itself is created by whoever writes to the path.
    pub fn reserve(&mut self, suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let serial = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = self
            .dir
            .join(format!("pdfweld-{:08x}-{serial:04}{suffix}", nanos));
        self.files.push(path.clone());
        path
    }

    /// Write `bytes` to a fresh registered path and return it.
    pub fn create(&mut self, bytes: &[u8], suffix: &str) -> Result<PathBuf> {
        let path = self.reserve(suffix);
        self.store.write(&path, bytes)?;
        Ok(path)
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.files {
            // Cleanup runs on both success and failure paths; a file that
            // could not be removed is not worth failing over here.
            let _ = self.store.delete(path);
        }
    }
}
