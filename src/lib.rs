//! # pdfweld
//!
//! Merge pages from multiple PDF files into a single document.
//!
//! pdfweld imports each selected source page as a self-contained form
//! XObject (content, fonts, images and any other resources it references)
//! and draws it at 1:1 scale onto a fresh output page, so page content
//! survives the merge byte-for-byte. Around that core it offers ordered
//! page selection per input, portrait/landscape page control, blank-page
//! padding for duplex printing and a compatibility pass for inputs newer
//! than the supported PDF version.
//!
//! # Examples
//!
//! ```no_run
//! use pdfweld::{MergeOptions, Merger, PageSelector, SourceDocument};
//!
//! let mut merger = Merger::new();
//! merger.add_source(SourceDocument::load("a.pdf".as_ref())?, PageSelector::All, None);
//! merger.add_source(
//!     SourceDocument::load("b.pdf".as_ref())?,
//!     PageSelector::parse("1,3,6,12-16")?,
//!     None,
//! );
//!
//! let merged = merger.merge(&MergeOptions::default())?;
//! std::fs::write("merged.pdf", merged.as_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod compat;
pub mod compose;
pub mod config;
mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod source;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;

pub use compose::Composer;
pub use config::{MergeOptions, Orientation, PageSelector};
pub use error::{MergeError, Result};
pub use merge::{MergeEntry, MergeStatistics, Merger};
pub use output::{MergeSummary, MergedPdf, DEFAULT_FILE_NAME};
pub use source::{PageGeometry, SourceDocument};
pub use template::PageTemplate;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
