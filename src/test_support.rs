//! Helpers for building small in-memory PDFs in unit tests.

use lopdf::{Document, Object, Stream, dictionary};

/// Description of one page for [`pdf_with_pages`].
#[derive(Debug, Clone)]
pub struct TestPage {
    pub media_box: [f64; 4],
    pub rotation: Option<i64>,
    pub text: Option<String>,
}

impl TestPage {
    /// US Letter portrait page, no content.
    pub fn letter() -> Self {
        Self::sized(612.0, 792.0)
    }

    /// Page of the given size with the origin at (0, 0).
    pub fn sized(width: f64, height: f64) -> Self {
        Self::with_box(0.0, 0.0, width, height)
    }

    /// Page with an explicit MediaBox.
    pub fn with_box(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self {
            media_box: [llx, lly, urx, ury],
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

/// Serialize a document containing the given pages.
pub fn pdf_with_pages(pages: &[TestPage]) -> Vec<u8> {
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
            "MediaBox" => Object::Array(
                page.media_box.iter().map(|v| Object::Real(*v as f32)).collect(),
            ),
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
    doc.save_to(&mut bytes).expect("test PDF should serialize");
    bytes
}
