//! Shared helpers for pdfweld integration tests.
//!
//! Fixtures are generated on the fly with `lopdf` rather than checked in,
//! so every test describes exactly the document shape it needs.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object, Stream, dictionary};

/// Description of one fixture page.
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub rotation: Option<i64>,
    pub text: Option<String>,
}

impl PageSpec {
    /// US Letter portrait page with a short text stream.
    pub fn letter(text: &str) -> Self {
        Self::sized(612.0, 792.0).with_text(text)
    }

    /// Page of the given size, no content.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            rotation: None,
            text: None,
        }
    }

    /// Set the page's `Rotate` entry.
    pub fn rotated(mut self, rotation: i64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Give the page a text content stream and a font resource.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

/// Serialize a fixture document containing the given pages.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for page in pages {
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(page.width as f32),
                Object::Real(page.height as f32),
            ]),
        };
        if let Some(rotation) = page.rotation {
            page_dict.set("Rotate", Object::Integer(rotation));
        }
        if let Some(text) = &page.text {
            let content = format!("BT\n/F1 24 Tf\n72 700 Td\n({text}) Tj\nET\n");
            let content_id =
                doc.add_object(Object::Stream(Stream::new(dictionary! {}, content.into_bytes())));
            page_dict.set("Contents", Object::Reference(content_id));
            page_dict.set(
                "Resources",
                Object::Dictionary(dictionary! {
                    "Font" => Object::Dictionary(dictionary! {
                        "F1" => Object::Reference(font_id),
                    }),
                }),
            );
        }
        let page_id = doc.add_object(page_dict);
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(count),
            "Kids" => Object::Array(kids),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture should serialize");
    bytes
}

/// Write a fixture document into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageSpec]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).expect("fixture should be writable");
    path
}

/// Fixture with `count` letter-sized text pages.
pub fn letter_pdf(count: usize) -> Vec<u8> {
    let pages: Vec<PageSpec> = (0..count)
        .map(|i| PageSpec::letter(&format!("page {}", i + 1)))
        .collect();
    build_pdf(&pages)
}

/// Parse merged output and return its pages' MediaBox sizes in order.
pub fn output_page_sizes(bytes: &[u8]) -> Vec<(f64, f64)> {
    let doc = Document::load_mem(bytes).expect("output should parse");
    let mut sizes = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let page = doc.get_dictionary(page_id).expect("page dictionary");
        let media_box = page
            .get(b"MediaBox")
            .expect("MediaBox")
            .as_array()
            .expect("MediaBox array");
        let urx = media_box[2].as_float().expect("urx") as f64;
        let ury = media_box[3].as_float().expect("ury") as f64;
        sizes.push((urx, ury));
    }
    sizes
}

/// Parse merged output and return its page count.
pub fn output_page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes)
        .expect("output should parse")
        .get_pages()
        .len()
}

/// Whether the 1-based `page` of the merged output has any content stream.
pub fn output_page_has_content(bytes: &[u8], page: u32) -> bool {
    let doc = Document::load_mem(bytes).expect("output should parse");
    let pages = doc.get_pages();
    let dict = doc.get_dictionary(pages[&page]).expect("page dictionary");
    dict.get(b"Contents").is_ok()
}
