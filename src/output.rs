//! Output projections for a finished merge.
//!
//! [`MergedPdf`] owns the serialized bytes plus the merge statistics and
//! offers the ways a host typically wants them: borrow the bytes (HTTP
//! inline/attachment responses), take ownership, or persist through a
//! [`ByteStore`]. It carries a file name for the persistence paths, with a
//! sensible default.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::io::ByteStore;
use crate::merge::MergeStatistics;

/// File name used when the host never sets one.
pub const DEFAULT_FILE_NAME: &str = "merged.pdf";

/// A serialized merged document.
#[derive(Debug, Clone)]
pub struct MergedPdf {
    bytes: Vec<u8>,
    file_name: String,
    statistics: MergeStatistics,
}

impl MergedPdf {
    pub(crate) fn new(bytes: Vec<u8>, statistics: MergeStatistics) -> Self {
        Self {
            bytes,
            file_name: DEFAULT_FILE_NAME.to_string(),
            statistics,
        }
    }

    /// Borrow the serialized document.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the serialized document.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the serialized document in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the document is empty. Never true for a completed merge.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File name used by [`MergedPdf::save_default`].
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Override the default file name.
    pub fn set_file_name(&mut self, file_name: impl Into<String>) -> &mut Self {
        self.file_name = file_name.into();
        self
    }

    /// Statistics gathered while merging.
    pub fn statistics(&self) -> &MergeStatistics {
        &self.statistics
    }

    /// Persist the document at an explicit path.
    pub fn save(&self, store: &dyn ByteStore, path: &Path) -> Result<()> {
        store.write(path, &self.bytes)
    }

    /// Persist the document under its file name inside `dir` and return the
    /// full path.
    pub fn save_default(&self, store: &dyn ByteStore, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        store.write(&path, &self.bytes)?;
        Ok(path)
    }

    /// JSON-friendly summary of the merge.
    pub fn summary(&self, output: &Path) -> MergeSummary {
        MergeSummary {
            output: output.display().to_string(),
            sources: self.statistics.sources,
            pages: self.statistics.pages_emitted,
            pad_pages: self.statistics.pad_pages,
            bytes: self.statistics.output_size,
            duration_ms: self.statistics.merge_time.as_millis() as u64,
        }
    }
}

/// Serializable merge report, printed by the CLI with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    /// Path the merged document was (or would be) written to.
    pub output: String,
    /// Number of source documents.
    pub sources: usize,
    /// Total pages in the output, including pad pages.
    pub pages: usize,
    /// Blank pages inserted for duplex alignment.
    pub pad_pages: usize,
    /// Output size in bytes.
    pub bytes: u64,
    /// Merge duration in milliseconds.
    pub duration_ms: u64,
}
