//! Merge configuration: page orientation, page selection and merge options.
//!
//! The types here are plain data. Validation happens at parse time
//! ([`PageSelector::parse`], [`Orientation::from_str`]); once constructed the
//! values are always well-formed, except that page indices are only checked
//! against the actual page count when the merge runs.

use std::fmt;
use std::str::FromStr;

use crate::error::{MergeError, Result};

/// Page orientation of an output page.
///
/// Orientation follows the classic AddPage convention: a portrait page keeps
/// the template's `(width, height)`, a landscape page swaps them to
/// `(height, width)`. It never rotates or scales the drawn content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Tall pages; the default.
    #[default]
    Portrait,
    /// Wide pages; output page dimensions are swapped.
    Landscape,
}

impl Orientation {
    /// Output page dimensions for a template of the given size.
    pub fn frame(&self, width: f64, height: f64) -> (f64, f64) {
        match self {
            Self::Portrait => (width, height),
            Self::Landscape => (height, width),
        }
    }
}

impl FromStr for Orientation {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "portrait" => Ok(Self::Portrait),
            "l" | "landscape" => Ok(Self::Landscape),
            other => Err(MergeError::invalid_input(format!(
                "unknown orientation '{other}' (expected 'P'/'portrait' or 'L'/'landscape')"
            ))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::Landscape => write!(f, "landscape"),
        }
    }
}

/// Which pages of a source document take part in a merge.
///
/// Page indices are 1-based and order-significant: `Pages(vec![3, 1])` emits
/// page 3 before page 1, and `Pages(vec![2, 2])` emits page 2 twice. Indices
/// are never clamped; an index beyond the document's last page fails the
/// merge with [`MergeError::PageNotFound`].
///
/// # Examples
///
/// ```
/// use pdfweld::PageSelector;
///
/// assert_eq!(PageSelector::parse("all").unwrap(), PageSelector::All);
/// assert_eq!(
///     PageSelector::parse("1,3,6,12-14").unwrap(),
///     PageSelector::Pages(vec![1, 3, 6, 12, 13, 14]),
/// );
/// assert!(PageSelector::parse("1,0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSelector {
    /// Every page, in ascending order.
    #[default]
    All,
    /// An explicit ordered list of 1-based page indices.
    Pages(Vec<u32>),
}

/// Upper bound on how many pages a single selector may name. Ranges expand
/// eagerly at parse time, so a typo like `1-4000000000` must be rejected
/// before it balloons into a multi-gigabyte page list.
const MAX_SELECTED_PAGES: usize = 100_000;

impl PageSelector {
    /// Parse a selector from its textual form.
    ///
    /// The grammar is `all` (case-insensitive) or a comma-separated list of
    /// page numbers and inclusive ranges (`12-16`). Whitespace around list
    /// items is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidPageSelector`] for empty input, page
    /// number zero, non-numeric items, reversed ranges, or a selector that
    /// names more pages than any plausible document holds.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(MergeError::invalid_selector(spec, "selector is empty"));
        }
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        let mut pages = Vec::new();
        for item in trimmed.split(',') {
            let item = item.trim();
            if let Some((start, end)) = item.split_once('-') {
                let start = parse_page_number(spec, start)?;
                let end = parse_page_number(spec, end)?;
                if start > end {
                    return Err(MergeError::invalid_selector(
                        spec,
                        format!("range '{item}' runs backwards"),
                    ));
                }
                let span = (end - start) as usize + 1;
                if pages.len() + span > MAX_SELECTED_PAGES {
                    return Err(MergeError::invalid_selector(
                        spec,
                        format!("selector names more than {MAX_SELECTED_PAGES} pages"),
                    ));
                }
                pages.extend(start..=end);
            } else {
                pages.push(parse_page_number(spec, item)?);
            }
        }
        Ok(Self::Pages(pages))
    }

    /// The concrete, ordered page list for a document with `page_count`
    /// pages. Does not bounds-check explicit indices; the importer does.
    pub fn resolve(&self, page_count: usize) -> Vec<u32> {
        match self {
            Self::All => (1..=page_count as u32).collect(),
            Self::Pages(pages) => pages.clone(),
        }
    }

    /// Number of pages this selector emits for a document with `page_count`
    /// pages.
    pub fn selected_count(&self, page_count: usize) -> usize {
        match self {
            Self::All => page_count,
            Self::Pages(pages) => pages.len(),
        }
    }
}

fn parse_page_number(spec: &str, item: &str) -> Result<u32> {
    let item = item.trim();
    let page: u32 = item
        .parse()
        .map_err(|_| MergeError::invalid_selector(spec, format!("'{item}' is not a page number")))?;
    if page == 0 {
        return Err(MergeError::invalid_selector(spec, "pages are numbered from 1"));
    }
    Ok(page)
}

/// Options applied to a whole merge.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Default orientation for entries that do not set their own.
    pub orientation: Orientation,
    /// Pad every odd-length entry (except the last) with a blank page so
    /// each source document starts on a front side when printed two-sided.
    pub duplex: bool,
}

impl MergeOptions {
    /// Options for a duplex merge with the given default orientation.
    pub fn duplex(orientation: Orientation) -> Self {
        Self {
            orientation,
            duplex: true,
        }
    }
}
