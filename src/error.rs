//! Error types for pdfweld.
//!
//! Every fallible operation in the crate returns [`MergeError`]. Errors carry
//! the source label (file path or `<memory>`) and, where it applies, the page
//! index that triggered the failure, so callers can report something
//! actionable without re-deriving context.
//!
//! A merge is all-or-nothing: the first error aborts it and no output bytes
//! are produced.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfweld operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Main error type for pdfweld operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A merge was requested with no source documents queued.
    #[error("No PDFs to merge; add at least one source document")]
    NoInput,

    /// An input path did not resolve to a file.
    #[error("Could not locate PDF at: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The input bytes could not be parsed into a usable page tree.
    #[error("Malformed PDF '{label}': {details}")]
    MalformedDocument {
        /// Label of the offending document (path or `<memory>`).
        label: String,
        /// What the parser choked on.
        details: String,
    },

    /// A page-selection string could not be parsed.
    #[error("Invalid page selector '{spec}': {details}")]
    InvalidPageSelector {
        /// The selector text as given.
        spec: String,
        /// What is wrong with it.
        details: String,
    },

    /// A selected page index does not exist in its source document.
    #[error("Could not load page {page} in PDF '{label}'; check that the page exists")]
    PageNotFound {
        /// Label of the document the page was requested from.
        label: String,
        /// 1-based page index that was requested.
        page: u32,
    },

    /// Serialization was requested on a composer holding zero pages.
    #[error("Cannot serialize a document with no pages")]
    EmptyDocument,

    /// Building or writing the output object graph failed.
    #[error("Output composition failed: {details}")]
    Composition {
        /// Details from the composition layer.
        details: String,
    },

    /// Input shape errors outside the selector grammar (CLI specs, globs,
    /// orientation strings).
    #[error("Invalid input: {details}")]
    InvalidInput {
        /// Description of the problem.
        details: String,
    },

    /// An underlying byte-store or filesystem operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl MergeError {
    /// Create a `MalformedDocument` error.
    pub fn malformed(label: impl Into<String>, details: impl Into<String>) -> Self {
        Self::MalformedDocument {
            label: label.into(),
            details: details.into(),
        }
    }

    /// Create an `InvalidPageSelector` error.
    pub fn invalid_selector(spec: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidPageSelector {
            spec: spec.into(),
            details: details.into(),
        }
    }

    /// Create a `Composition` error.
    pub fn composition(details: impl Into<String>) -> Self {
        Self::Composition {
            details: details.into(),
        }
    }

    /// Create an `InvalidInput` error.
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput {
            details: details.into(),
        }
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoInput => 1,
            Self::InvalidPageSelector { .. } => 1,
            Self::InvalidInput { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::MalformedDocument { .. } => 3,
            Self::PageNotFound { .. } => 3,
            Self::EmptyDocument => 4,
            Self::Composition { .. } => 4,
            Self::Io { .. } => 5,
        }
    }
}
