//! Page import: turning a source page into a self-contained template.
//!
//! A [`PageTemplate`] is the drawable form of one source page: its
//! decompressed content stream, the transitive closure of every object its
//! resource dictionary references, and a placement matrix that compensates
//! for the page's `Rotate` value and MediaBox origin. Once imported, a
//! template no longer borrows the source document and can be drawn onto any
//! output page.
//!
//! The closure walk deliberately stops at page-tree structure: `Parent`
//! entries are never followed and objects typed `Page`, `Pages` or `Catalog`
//! are never copied, so importing a page cannot drag the source's whole page
//! tree into the output.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};

use crate::error::{MergeError, Result};
use crate::source::{PageGeometry, SourceDocument};

/// A source page packaged as a drawable unit.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    label: String,
    page: u32,
    content: Vec<u8>,
    resources: Object,
    objects: BTreeMap<ObjectId, Object>,
    geometry: PageGeometry,
}

impl PageTemplate {
    /// Import a 1-based page from a source document.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::PageNotFound`] when the index is out of range
    /// and [`MergeError::MalformedDocument`] when the page's content streams
    /// or geometry cannot be read.
    pub fn import(source: &SourceDocument, page: u32) -> Result<Self> {
        let page_id = source.page_id(page).ok_or_else(|| MergeError::PageNotFound {
            label: source.label().to_string(),
            page,
        })?;
        let geometry = source.geometry(page)?;

        let content = source
            .document()
            .get_page_content(page_id)
            .map_err(|err| source.malformed(format!("page {page} content: {err}")))?;

        let resources = source.resources(page_id)?.unwrap_or(Object::Null);
        let mut objects = BTreeMap::new();
        collect_referenced_objects(source.document(), &resources, &mut objects);

        Ok(Self {
            label: source.label().to_string(),
            page,
            content,
            resources,
            objects,
            geometry,
        })
    }

    /// Label of the document this page came from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 1-based index of the imported page in its source.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Effective width, with source rotation applied.
    pub fn width(&self) -> f64 {
        self.geometry.width()
    }

    /// Effective height, with source rotation applied.
    pub fn height(&self) -> f64 {
        self.geometry.height()
    }

    pub(crate) fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn resources(&self) -> &Object {
        &self.resources
    }

    pub(crate) fn objects(&self) -> &BTreeMap<ObjectId, Object> {
        &self.objects
    }

    /// Bounding box of the form XObject in the source page's coordinate
    /// space, `[llx, lly, urx, ury]`.
    pub(crate) fn bounding_box(&self) -> [f64; 4] {
        self.geometry.media_box
    }

    /// Placement matrix `[a b c d e f]` that maps the source page content
    /// into the output page, so that after applying the source `Rotate` the
    /// visible content lands at the origin with its effective size.
    pub(crate) fn matrix(&self) -> [f64; 6] {
        let [llx, lly, urx, ury] = self.geometry.media_box;
        match self.geometry.rotation {
            90 => [0.0, -1.0, 1.0, 0.0, -lly, urx],
            180 => [-1.0, 0.0, 0.0, -1.0, urx, ury],
            270 => [0.0, 1.0, -1.0, 0.0, ury, -llx],
            _ => [1.0, 0.0, 0.0, 1.0, -llx, -lly],
        }
    }
}

/// Recursively pull every object reachable from `object` into `collected`,
/// skipping `Parent` links and page-tree nodes.
fn collect_referenced_objects(
    doc: &Document,
    object: &Object,
    collected: &mut BTreeMap<ObjectId, Object>,
) {
    match object {
        Object::Reference(id) => {
            if collected.contains_key(id) {
                return;
            }
            // Dangling references in the source are tolerated here; the
            // composer nulls out anything that was never collected.
            let Ok(target) = doc.get_object(*id) else {
                return;
            };
            if is_page_tree_node(target) {
                return;
            }
            collected.insert(*id, target.clone());
            collect_referenced_objects(doc, target, collected);
        }
        Object::Array(items) => {
            for item in items {
                collect_referenced_objects(doc, item, collected);
            }
        }
        Object::Dictionary(dict) => {
            for (key, value) in dict.iter() {
                if key.as_slice() == b"Parent" {
                    continue;
                }
                collect_referenced_objects(doc, value, collected);
            }
        }
        Object::Stream(stream) => {
            for (key, value) in stream.dict.iter() {
                if key.as_slice() == b"Parent" {
                    continue;
                }
                collect_referenced_objects(doc, value, collected);
            }
        }
        _ => {}
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(|ty| ty.as_name().ok())
        .is_some_and(|name| matches!(name, b"Page" | b"Pages" | b"Catalog"))
}
