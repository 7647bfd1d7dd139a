//! Source document parsing and page-tree inspection.
//!
//! [`SourceDocument`] wraps a parsed [`lopdf::Document`] together with its
//! 1-based page map and a display label. It is strictly read-only: the merge
//! never mutates a source, so one `SourceDocument` can back any number of
//! page imports.
//!
//! Page attributes that the PDF page tree inherits (`MediaBox`, `Rotate`,
//! `Resources`) are resolved here by walking the `Parent` chain, so the rest
//! of the crate always sees fully resolved per-page values.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::{MergeError, Result};

/// Label used for documents constructed from in-memory bytes.
pub const MEMORY_LABEL: &str = "<memory>";

/// Depth limit when chasing references or `Parent` links, to survive
/// malformed documents with reference cycles.
const MAX_CHAIN_DEPTH: usize = 64;

/// Resolved geometry of a single source page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// The page's `MediaBox` as `[llx, lly, urx, ury]`, inherited if needed.
    pub media_box: [f64; 4],
    /// The page's `Rotate` value normalized to 0, 90, 180 or 270.
    pub rotation: i32,
}

impl PageGeometry {
    /// Width of the MediaBox, before rotation is applied.
    pub fn box_width(&self) -> f64 {
        self.media_box[2] - self.media_box[0]
    }

    /// Height of the MediaBox, before rotation is applied.
    pub fn box_height(&self) -> f64 {
        self.media_box[3] - self.media_box[1]
    }

    /// Width as displayed, with 90/270 rotation swapping the axes.
    pub fn width(&self) -> f64 {
        match self.rotation {
            90 | 270 => self.box_height(),
            _ => self.box_width(),
        }
    }

    /// Height as displayed, with 90/270 rotation swapping the axes.
    pub fn height(&self) -> f64 {
        match self.rotation {
            90 | 270 => self.box_width(),
            _ => self.box_height(),
        }
    }
}

/// A parsed, immutable source PDF.
///
/// # Examples
///
/// ```no_run
/// use pdfweld::SourceDocument;
///
/// let source = SourceDocument::load("report.pdf".as_ref())?;
/// println!("{} has {} pages", source.label(), source.page_count());
/// # Ok::<(), pdfweld::MergeError>(())
/// ```
pub struct SourceDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    label: String,
}

impl SourceDocument {
    /// Parse a source document from raw bytes.
    ///
    /// `label` is used in error messages and statistics; pass the originating
    /// path when there is one, or see [`SourceDocument::from_memory`].
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::MalformedDocument`] when the bytes are not a
    /// parseable PDF or the document exposes no pages.
    pub fn from_bytes(bytes: &[u8], label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let doc = Document::load_mem(bytes)
            .map_err(|err| MergeError::malformed(&label, err.to_string()))?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(MergeError::malformed(&label, "document has no pages"));
        }
        Ok(Self { doc, pages, label })
    }

    /// Parse a source document from bytes with the `<memory>` label.
    pub fn from_memory(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(bytes, MEMORY_LABEL)
    }

    /// Load and parse a source document from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::FileNotFound`] when the path does not exist,
    /// [`MergeError::Io`] when it cannot be read and
    /// [`MergeError::MalformedDocument`] when it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(MergeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path).map_err(|err| MergeError::io(path, err))?;
        Self::from_bytes(&bytes, path.display().to_string())
    }

    /// Display label of this document (path or `<memory>`).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// PDF version declared in the document header, e.g. `"1.4"`.
    pub fn version(&self) -> &str {
        &self.doc.version
    }

    /// Object id of a 1-based page index, if the page exists.
    pub(crate) fn page_id(&self, page: u32) -> Option<ObjectId> {
        self.pages.get(&page).copied()
    }

    /// Borrow the underlying object graph.
    pub(crate) fn document(&self) -> &Document {
        &self.doc
    }

    /// Resolved geometry of a 1-based page index.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::PageNotFound`] for an out-of-range index and
    /// [`MergeError::MalformedDocument`] when the page has no resolvable
    /// `MediaBox`.
    pub fn geometry(&self, page: u32) -> Result<PageGeometry> {
        let page_id = self.page_id(page).ok_or_else(|| MergeError::PageNotFound {
            label: self.label.clone(),
            page,
        })?;

        let media_box = match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(value) => self.read_rectangle(&value)?,
            None => {
                return Err(MergeError::malformed(
                    &self.label,
                    format!("page {page} has no MediaBox"),
                ));
            }
        };

        let rotation = match self.inherited_attribute(page_id, b"Rotate")? {
            Some(value) => {
                let raw = self
                    .resolve(&value)?
                    .as_i64()
                    .map_err(|_| self.malformed_page(page, "Rotate is not an integer"))?;
                normalize_rotation(raw)
            }
            None => 0,
        };

        Ok(PageGeometry {
            media_box,
            rotation,
        })
    }

    /// The page's `Resources` entry, inherited if needed. May be a direct
    /// dictionary or a reference; absent in minimal documents.
    pub(crate) fn resources(&self, page_id: ObjectId) -> Result<Option<Object>> {
        self.inherited_attribute(page_id, b"Resources")
    }

    /// Look up `key` on the page dictionary, walking `Parent` links until a
    /// value is found or the tree root is reached.
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current = page_id;
        for _ in 0..MAX_CHAIN_DEPTH {
            let dict = self
                .doc
                .get_dictionary(current)
                .map_err(|err| MergeError::malformed(&self.label, err.to_string()))?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(value.clone()));
            }
            match dict.get(b"Parent") {
                Ok(parent) => {
                    current = parent.as_reference().map_err(|_| {
                        MergeError::malformed(&self.label, "page tree Parent is not a reference")
                    })?;
                }
                Err(_) => return Ok(None),
            }
        }
        Err(MergeError::malformed(
            &self.label,
            "page tree Parent chain is too deep or cyclic",
        ))
    }

    /// Follow reference indirections down to a direct object.
    fn resolve<'a>(&'a self, mut object: &'a Object) -> Result<&'a Object> {
        for _ in 0..MAX_CHAIN_DEPTH {
            match object {
                Object::Reference(id) => {
                    object = self
                        .doc
                        .get_object(*id)
                        .map_err(|err| MergeError::malformed(&self.label, err.to_string()))?;
                }
                other => return Ok(other),
            }
        }
        Err(MergeError::malformed(
            &self.label,
            "reference chain is too deep or cyclic",
        ))
    }

    fn read_rectangle(&self, value: &Object) -> Result<[f64; 4]> {
        let array = self
            .resolve(value)?
            .as_array()
            .map_err(|_| MergeError::malformed(&self.label, "MediaBox is not an array"))?;
        if array.len() != 4 {
            return Err(MergeError::malformed(
                &self.label,
                format!("MediaBox has {} entries, expected 4", array.len()),
            ));
        }
        let mut rect = [0.0; 4];
        for (slot, entry) in rect.iter_mut().zip(array) {
            *slot = self
                .resolve(entry)?
                .as_float()
                .map_err(|_| MergeError::malformed(&self.label, "MediaBox entry is not numeric"))?
                as f64;
        }
        Ok(rect)
    }

    fn malformed_page(&self, page: u32, details: &str) -> MergeError {
        MergeError::malformed(&self.label, format!("page {page}: {details}"))
    }

    pub(crate) fn malformed(&self, details: impl Into<String>) -> MergeError {
        MergeError::malformed(&self.label, details)
    }
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("label", &self.label)
            .field("pages", &self.pages.len())
            .finish()
    }
}

/// Snap a raw `Rotate` value to the nearest legal quarter turn. PDF only
/// allows multiples of 90; anything else is treated as unrotated.
fn normalize_rotation(raw: i64) -> i32 {
    let normalized = raw.rem_euclid(360);
    match normalized {
        90 | 180 | 270 => normalized as i32,
        _ => 0,
    }
}
