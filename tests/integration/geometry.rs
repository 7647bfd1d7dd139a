//! Page geometry through the merge: sizes, orientation, rotation.

use pdfweld::{MergeOptions, Merger, Orientation, PageSelector};

use crate::common::{build_pdf, output_page_sizes, PageSpec};

#[test]
fn two_letter_pages_stay_612_by_792() {
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &build_pdf(&[PageSpec::letter("one"), PageSpec::letter("two")]),
            PageSelector::All,
            None,
        )
        .unwrap();
    let merged = merger.merge(&MergeOptions::default()).unwrap();
    let sizes = output_page_sizes(merged.as_bytes());
    assert_eq!(sizes, vec![(612.0, 792.0), (612.0, 792.0)]);
}

#[test]
fn mixed_sizes_are_preserved_per_page() {
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &build_pdf(&[
                PageSpec::letter("letter"),
                PageSpec::sized(595.0, 842.0).with_text("a4"),
            ]),
            PageSelector::All,
            None,
        )
        .unwrap();
    let merged = merger.merge(&MergeOptions::default()).unwrap();
    assert_eq!(
        output_page_sizes(merged.as_bytes()),
        vec![(612.0, 792.0), (595.0, 842.0)]
    );
}

#[test]
fn landscape_default_swaps_every_page() {
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &build_pdf(&[PageSpec::letter("one"), PageSpec::letter("two")]),
            PageSelector::All,
            None,
        )
        .unwrap();
    let merged = merger
        .merge(&MergeOptions {
            orientation: Orientation::Landscape,
            duplex: false,
        })
        .unwrap();
    assert_eq!(
        output_page_sizes(merged.as_bytes()),
        vec![(792.0, 612.0), (792.0, 612.0)]
    );
}

#[test]
fn entry_orientation_overrides_merge_default() {
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &build_pdf(&[PageSpec::letter("portrait entry")]),
            PageSelector::All,
            None,
        )
        .unwrap();
    merger
        .add_bytes(
            &build_pdf(&[PageSpec::letter("landscape entry")]),
            PageSelector::All,
            Some(Orientation::Landscape),
        )
        .unwrap();

    let merged = merger.merge(&MergeOptions::default()).unwrap();
    assert_eq!(
        output_page_sizes(merged.as_bytes()),
        vec![(612.0, 792.0), (792.0, 612.0)]
    );
}

#[test]
fn rotated_source_page_takes_effective_size() {
    // A letter page rotated 90 degrees displays as 792x612; the output page
    // adopts that effective size and the rotation is baked into the drawn
    // content instead of a Rotate entry.
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &build_pdf(&[PageSpec::letter("rotated").rotated(90)]),
            PageSelector::All,
            None,
        )
        .unwrap();
    let merged = merger.merge(&MergeOptions::default()).unwrap();
    assert_eq!(output_page_sizes(merged.as_bytes()), vec![(792.0, 612.0)]);

    let doc = lopdf::Document::load_mem(merged.as_bytes()).unwrap();
    let pages = doc.get_pages();
    let page = doc.get_dictionary(pages[&1]).unwrap();
    assert!(page.get(b"Rotate").is_err());
}
