//! Output document composition.
//!
//! [`Composer`] builds the merged document one page at a time. Each call to
//! [`Composer::begin_page`] opens a fresh output page; [`Composer::draw_template`]
//! copies an imported template into the document as a form XObject and paints
//! it onto the current page at 1:1 scale. [`Composer::serialize`] consumes
//! the composer, so a finished document can never be appended to and every
//! merge starts from a clean writer.
//!
//! Object identity: template objects keep their source-document ids until
//! they are drawn, at which point the composer assigns fresh ids in the
//! output document and rewrites every reference. References to objects that
//! were not part of the template's closure (pruned page-tree structure,
//! dangling ids in the source) become `null`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::config::Orientation;
use crate::error::{MergeError, Result};
use crate::template::PageTemplate;

/// Output PDF header version. Everything the composer emits is expressible
/// in 1.4, which matches the compatibility threshold used for inputs.
const OUTPUT_VERSION: &str = "1.4";

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Writer for a single merged document.
///
/// # Examples
///
/// ```no_run
/// use pdfweld::{Composer, Orientation, PageTemplate, SourceDocument};
///
/// let source = SourceDocument::load("a.pdf".as_ref())?;
/// let template = PageTemplate::import(&source, 1)?;
///
/// let mut composer = Composer::new();
/// composer.begin_page(Orientation::Portrait, template.width(), template.height());
/// composer.draw_template(&template)?;
/// let bytes = composer.serialize()?;
/// # Ok::<(), pdfweld::MergeError>(())
/// ```
pub struct Composer {
    doc: Document,
    pages: Vec<ObjectId>,
    current: Option<ObjectId>,
    templates_drawn: usize,
}

impl Composer {
    /// Create an empty composer.
    pub fn new() -> Self {
        Self {
            doc: Document::with_version(OUTPUT_VERSION),
            pages: Vec::new(),
            current: None,
            templates_drawn: 0,
        }
    }

    /// Number of pages begun so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Open a new output page and make it current.
    ///
    /// `width` and `height` describe the content to be drawn; the actual
    /// page dimensions follow the orientation (landscape swaps them). A page
    /// that never receives a template stays blank, which is how duplex pad
    /// pages are made.
    pub fn begin_page(&mut self, orientation: Orientation, width: f64, height: f64) {
        let (page_width, page_height) = orientation.frame(width, height);
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                real(page_width),
                real(page_height),
            ]),
        });
        self.pages.push(page_id);
        self.current = Some(page_id);
    }

    /// Draw an imported template onto the current page at 1:1 scale.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Composition`] when called before the first
    /// [`Composer::begin_page`].
    pub fn draw_template(&mut self, template: &PageTemplate) -> Result<()> {
        let page_id = self
            .current
            .ok_or_else(|| MergeError::composition("draw_template called before begin_page"))?;

        // Give every object in the template's closure a fresh id in the
        // output document, then rewrite references accordingly.
        let mut id_map = BTreeMap::new();
        for old_id in template.objects().keys() {
            id_map.insert(*old_id, self.doc.new_object_id());
        }
        for (old_id, object) in template.objects() {
            let remapped = remap_object(object, &id_map);
            self.doc.objects.insert(id_map[old_id], remapped);
        }
        let resources = remap_object(template.resources(), &id_map);

        let form_id = self.add_form_xobject(template, resources);
        let name = format!("Tpl{}", self.templates_drawn);
        self.templates_drawn += 1;

        let draw_op = Stream::new(
            dictionary! {},
            format!("q\n/{name} Do\nQ\n").into_bytes(),
        );
        let content_id = self.doc.add_object(Object::Stream(draw_op));

        self.attach_to_page(page_id, &name, form_id, content_id)
    }

    fn add_form_xobject(&mut self, template: &PageTemplate, resources: Object) -> ObjectId {
        let [llx, lly, urx, ury] = template.bounding_box();
        let matrix = template.matrix();
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => Object::Integer(1),
            "BBox" => Object::Array(vec![real(llx), real(lly), real(urx), real(ury)]),
            "Matrix" => Object::Array(matrix.iter().map(|v| real(*v)).collect()),
        };
        if !matches!(resources, Object::Null) {
            dict.set("Resources", resources);
        }
        self.doc
            .add_object(Object::Stream(Stream::new(dict, template.content().to_vec())))
    }

    /// Register the form under `name` in the page's XObject resources and
    /// append the draw operation to its content chain.
    fn attach_to_page(
        &mut self,
        page_id: ObjectId,
        name: &str,
        form_id: ObjectId,
        content_id: ObjectId,
    ) -> Result<()> {
        let page_dict = self
            .doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| MergeError::composition(format!("output page lookup: {err}")))?;

        let contents = match page_dict.get(b"Contents").ok().cloned() {
            None => Object::Reference(content_id),
            Some(Object::Reference(existing)) => Object::Array(vec![
                Object::Reference(existing),
                Object::Reference(content_id),
            ]),
            Some(Object::Array(mut items)) => {
                items.push(Object::Reference(content_id));
                Object::Array(items)
            }
            Some(other) => {
                return Err(MergeError::composition(format!(
                    "unexpected Contents entry on output page: {other:?}"
                )));
            }
        };
        page_dict.set("Contents", contents);

        let mut resources = match page_dict.get(b"Resources").ok() {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => dictionary! {
                "ProcSet" => Object::Array(vec![
                    "PDF".into(),
                    "Text".into(),
                    "ImageB".into(),
                    "ImageC".into(),
                    "ImageI".into(),
                ]),
            },
        };
        let mut xobjects = match resources.get(b"XObject").ok() {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        xobjects.set(name.as_bytes().to_vec(), Object::Reference(form_id));
        resources.set("XObject", Object::Dictionary(xobjects));
        page_dict.set("Resources", Object::Dictionary(resources));

        Ok(())
    }

    /// Finish the document: build the page tree and catalog, renumber and
    /// compress, and return the serialized bytes. Consumes the composer.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::EmptyDocument`] when no page was begun and
    /// [`MergeError::Composition`] when the object graph cannot be written.
    pub fn serialize(mut self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(MergeError::EmptyDocument);
        }

        let pages_id = self.doc.new_object_id();
        for page_id in &self.pages {
            let page_dict = self
                .doc
                .get_object_mut(*page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|err| MergeError::composition(format!("output page lookup: {err}")))?;
            page_dict.set("Parent", Object::Reference(pages_id));
        }

        let kids: Vec<Object> = self.pages.iter().map(|id| Object::Reference(*id)).collect();
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => Object::Integer(self.pages.len() as i64),
                "Kids" => Object::Array(kids),
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.renumber_objects();
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|err| MergeError::composition(err.to_string()))?;
        Ok(bytes)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

fn remap_object(object: &Object, id_map: &BTreeMap<ObjectId, ObjectId>) -> Object {
    match object {
        Object::Reference(id) => match id_map.get(id) {
            Some(new_id) => Object::Reference(*new_id),
            None => Object::Null,
        },
        Object::Array(items) => Object::Array(items.iter().map(|o| remap_object(o, id_map)).collect()),
        Object::Dictionary(dict) => Object::Dictionary(remap_dictionary(dict, id_map)),
        Object::Stream(stream) => {
            let mut stream = stream.clone();
            stream.dict = remap_dictionary(&stream.dict, id_map);
            Object::Stream(stream)
        }
        other => other.clone(),
    }
}

fn remap_dictionary(dict: &Dictionary, id_map: &BTreeMap<ObjectId, ObjectId>) -> Dictionary {
    let mut remapped = Dictionary::new();
    for (key, value) in dict.iter() {
        remapped.set(key.clone(), remap_object(value, id_map));
    }
    remapped
}
