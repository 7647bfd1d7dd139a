//! Duplex padding behavior across multi-document merges.

use pdfweld::{Orientation, PageSelector, Merger};

use crate::common::{
    letter_pdf, output_page_count, output_page_has_content, output_page_sizes, PageSpec,
    build_pdf,
};

fn queue(counts: &[usize]) -> Merger {
    let mut merger = Merger::new();
    for &count in counts {
        merger
            .add_bytes(&letter_pdf(count), PageSelector::All, None)
            .unwrap();
    }
    merger
}

#[test]
fn pads_odd_entries_but_not_the_last() {
    let merger = queue(&[3, 4, 5]);
    let merged = merger.duplex_merge(Orientation::Portrait).unwrap();

    // 3 + pad + 4 + 5; the trailing odd entry is never padded.
    assert_eq!(merged.statistics().pad_pages, 1);
    assert_eq!(merged.statistics().pages_emitted, 13);
    assert_eq!(output_page_count(merged.as_bytes()), 13);

    // Page 4 is the pad page: blank, everything else has content.
    assert!(!output_page_has_content(merged.as_bytes(), 4));
    for page in [1, 2, 3, 5, 6, 13] {
        assert!(output_page_has_content(merged.as_bytes(), page));
    }
}

#[test]
fn even_entries_are_never_padded() {
    let merger = queue(&[2, 2, 4]);
    let merged = merger.duplex_merge(Orientation::Portrait).unwrap();
    assert_eq!(merged.statistics().pad_pages, 0);
    assert_eq!(output_page_count(merged.as_bytes()), 8);
}

#[test]
fn non_duplex_merge_never_pads() {
    let merger = queue(&[3, 5]);
    let merged = merger
        .merge(&pdfweld::MergeOptions::default())
        .unwrap();
    assert_eq!(merged.statistics().pad_pages, 0);
    assert_eq!(output_page_count(merged.as_bytes()), 8);
}

#[test]
fn pad_page_matches_last_drawn_page_size() {
    // First entry ends on an A4 page; the pad page must copy that size,
    // not the size of the next entry's first page.
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &build_pdf(&[
                PageSpec::letter("1-1"),
                PageSpec::letter("1-2"),
                PageSpec::sized(595.0, 842.0).with_text("1-3"),
            ]),
            PageSelector::All,
            None,
        )
        .unwrap();
    merger
        .add_bytes(&letter_pdf(2), PageSelector::All, None)
        .unwrap();

    let merged = merger.duplex_merge(Orientation::Portrait).unwrap();
    let sizes = output_page_sizes(merged.as_bytes());
    assert_eq!(sizes.len(), 6);
    assert_eq!(sizes[2], (595.0, 842.0));
    // Pad page, sized like the page before it.
    assert_eq!(sizes[3], (595.0, 842.0));
    assert_eq!(sizes[4], (612.0, 792.0));
}

#[test]
fn selector_parity_drives_padding() {
    // A 4-page source reduced to one page by its selector still counts as
    // an odd entry.
    let mut merger = Merger::new();
    merger
        .add_bytes(&letter_pdf(4), PageSelector::Pages(vec![2]), None)
        .unwrap();
    merger
        .add_bytes(&letter_pdf(2), PageSelector::All, None)
        .unwrap();

    let merged = merger.duplex_merge(Orientation::Portrait).unwrap();
    assert_eq!(merged.statistics().pad_pages, 1);
    assert_eq!(output_page_count(merged.as_bytes()), 4);
}
