//! Merge orchestration.
//!
//! [`Merger`] holds an ordered queue of [`MergeEntry`] values (source
//! document + page selector + optional orientation override) and runs the
//! import/compose pipeline over them. Each call to [`Merger::merge`] uses a
//! fresh [`Composer`], so repeated merges of the same queue are independent
//! and produce identical bytes.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::compose::Composer;
use crate::config::{MergeOptions, Orientation, PageSelector};
use crate::error::{MergeError, Result};
use crate::io::ByteStore;
use crate::output::MergedPdf;
use crate::source::SourceDocument;
use crate::template::PageTemplate;

/// One source document queued for merging.
#[derive(Debug)]
pub struct MergeEntry {
    source: SourceDocument,
    selector: PageSelector,
    orientation: Option<Orientation>,
}

impl MergeEntry {
    /// Queue entry with an optional per-entry orientation override.
    pub fn new(
        source: SourceDocument,
        selector: PageSelector,
        orientation: Option<Orientation>,
    ) -> Self {
        Self {
            source,
            selector,
            orientation,
        }
    }

    /// Label of the entry's source document.
    pub fn label(&self) -> &str {
        self.source.label()
    }

    /// Number of pages this entry will emit.
    pub fn page_count(&self) -> usize {
        self.selector.selected_count(self.source.page_count())
    }

    /// Number of pages in the entry's source document.
    pub fn source_page_count(&self) -> usize {
        self.source.page_count()
    }
}

/// Statistics about a completed merge.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of source documents merged.
    pub sources: usize,
    /// Total pages in the output, including pad pages.
    pub pages_emitted: usize,
    /// Blank pages inserted for duplex alignment.
    pub pad_pages: usize,
    /// Size of the serialized output in bytes.
    pub output_size: u64,
    /// Wall-clock time of the merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Human-readable output size, e.g. `"1.2 MB"`.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Queue of source documents and the merge entry point.
///
/// # Examples
///
/// ```no_run
/// use pdfweld::{MergeOptions, Merger, PageSelector, SourceDocument};
///
/// let mut merger = Merger::new();
/// merger.add_source(
///     SourceDocument::load("a.pdf".as_ref())?,
///     PageSelector::All,
///     None,
/// );
/// merger.add_source(
///     SourceDocument::load("b.pdf".as_ref())?,
///     PageSelector::parse("1,3,6")?,
///     None,
/// );
/// let merged = merger.merge(&MergeOptions::default())?;
/// std::fs::write("out.pdf", merged.as_bytes())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct Merger {
    entries: Vec<MergeEntry>,
}

impl Merger {
    /// Create an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an already-parsed source document.
    pub fn add_source(
        &mut self,
        source: SourceDocument,
        selector: PageSelector,
        orientation: Option<Orientation>,
    ) -> &mut Self {
        self.entries.push(MergeEntry::new(source, selector, orientation));
        self
    }

    /// Read a PDF from a byte store and queue it.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::FileNotFound`] when the store cannot resolve
    /// `path` and [`MergeError::MalformedDocument`] when it does not parse.
    pub fn add_file(
        &mut self,
        store: &dyn ByteStore,
        path: &Path,
        selector: PageSelector,
        orientation: Option<Orientation>,
    ) -> Result<&mut Self> {
        let bytes = store.read(path)?;
        let source = SourceDocument::from_bytes(&bytes, path.display().to_string())?;
        Ok(self.add_source(source, selector, orientation))
    }

    /// Parse a PDF from raw bytes and queue it under the `<memory>` label.
    pub fn add_bytes(
        &mut self,
        bytes: &[u8],
        selector: PageSelector,
        orientation: Option<Orientation>,
    ) -> Result<&mut Self> {
        let source = SourceDocument::from_memory(bytes)?;
        Ok(self.add_source(source, selector, orientation))
    }

    /// Queued entries, in merge order.
    pub fn entries(&self) -> &[MergeEntry] {
        &self.entries
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the merge and serialize the result.
    ///
    /// Entries are processed in queue order; within an entry, pages follow
    /// the selector's order. When `options.duplex` is set, every entry that
    /// emitted an odd number of pages (except the last entry) is padded with
    /// one blank page sized like its last drawn page, so the next document
    /// starts on a front side.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::NoInput`] for an empty queue and propagates the
    /// first import or composition failure; on failure no output exists.
    pub fn merge(&self, options: &MergeOptions) -> Result<MergedPdf> {
        if self.entries.is_empty() {
            return Err(MergeError::NoInput);
        }

        let start = Instant::now();
        let mut composer = Composer::new();
        let mut pad_pages = 0;

        for (index, entry) in self.entries.iter().enumerate() {
            let orientation = entry.orientation.unwrap_or(options.orientation);
            let pages = entry.selector.resolve(entry.source.page_count());
            let mut last_size = None;

            for &page in &pages {
                let template = PageTemplate::import(&entry.source, page)?;
                composer.begin_page(orientation, template.width(), template.height());
                composer.draw_template(&template)?;
                last_size = Some((template.width(), template.height()));
            }

            let is_last = index + 1 == self.entries.len();
            if options.duplex
                && pages.len() % 2 == 1
                && !is_last
                && let Some((width, height)) = last_size
            {
                composer.begin_page(orientation, width, height);
                pad_pages += 1;
            }
        }

        let pages_emitted = composer.page_count();
        let bytes = composer.serialize()?;
        let statistics = MergeStatistics {
            sources: self.entries.len(),
            pages_emitted,
            pad_pages,
            output_size: bytes.len() as u64,
            merge_time: start.elapsed(),
        };
        Ok(MergedPdf::new(bytes, statistics))
    }

    /// Merge with duplex padding enabled; equivalent to [`Merger::merge`]
    /// with [`MergeOptions::duplex`].
    pub fn duplex_merge(&self, orientation: Orientation) -> Result<MergedPdf> {
        self.merge(&MergeOptions::duplex(orientation))
    }
}
