//! Page selection across whole merges.

use pdfweld::{MergeError, MergeOptions, Merger, PageSelector};

use crate::common::{letter_pdf, output_page_count};

#[test]
fn all_selectors_sum_page_counts() {
    let counts = [1, 4, 2];
    let mut merger = Merger::new();
    for count in counts {
        merger
            .add_bytes(&letter_pdf(count), PageSelector::All, None)
            .unwrap();
    }
    let merged = merger.merge(&MergeOptions::default()).unwrap();
    assert_eq!(output_page_count(merged.as_bytes()), 7);
}

#[test]
fn explicit_selection_controls_order_and_repeats() {
    let mut merger = Merger::new();
    merger
        .add_bytes(
            &letter_pdf(5),
            PageSelector::parse("4,1,1,3").unwrap(),
            None,
        )
        .unwrap();
    let merged = merger.merge(&MergeOptions::default()).unwrap();
    assert_eq!(output_page_count(merged.as_bytes()), 4);
    assert_eq!(merged.statistics().pages_emitted, 4);
}

#[test]
fn out_of_range_page_aborts_whole_merge() {
    let mut merger = Merger::new();
    merger
        .add_bytes(&letter_pdf(10), PageSelector::Pages(vec![1, 2, 99]), None)
        .unwrap();

    let err = merger.merge(&MergeOptions::default()).unwrap_err();
    match err {
        MergeError::PageNotFound { page, .. } => assert_eq!(page, 99),
        other => panic!("expected PageNotFound, got {other:?}"),
    }
}

#[test]
fn out_of_range_in_later_entry_produces_no_output() {
    let mut merger = Merger::new();
    merger
        .add_bytes(&letter_pdf(2), PageSelector::All, None)
        .unwrap();
    merger
        .add_bytes(&letter_pdf(2), PageSelector::Pages(vec![3]), None)
        .unwrap();

    // The first entry imports cleanly, but the failed second entry means
    // the merge yields an error value and nothing else.
    assert!(merger.merge(&MergeOptions::default()).is_err());
}

#[test]
fn range_selectors_expand_in_place() {
    let mut merger = Merger::new();
    merger
        .add_bytes(&letter_pdf(6), PageSelector::parse("2-4,6").unwrap(), None)
        .unwrap();
    let merged = merger.merge(&MergeOptions::default()).unwrap();
    assert_eq!(output_page_count(merged.as_bytes()), 4);
}
