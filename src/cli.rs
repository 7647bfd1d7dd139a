//! CLI argument parsing for pdfweld.
//!
//! This module defines the command-line interface structure using `clap` and
//! turns the raw arguments into merge inputs: each positional input is a
//! path, optionally followed by a page selector and an orientation
//! (`path=pages[=orientation]`), and paths containing glob characters are
//! expanded in sorted order.
//!
//! # Examples
//!
//! ```no_run
//! use pdfweld::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Merging {} inputs", cli.inputs.len());
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::compat::{self, CompatOptions};
use crate::config::{MergeOptions, Orientation, PageSelector};
use crate::error::{MergeError, Result};

/// Merge pages from multiple PDF files into a single document.
///
/// pdfweld copies pages verbatim (content, fonts, images) onto fresh output
/// pages, with per-input page selection, portrait/landscape control and
/// optional blank-page padding for duplex printing.
#[derive(Parser, Debug)]
#[command(name = "pdfweld")]
#[command(version)]
#[command(about = "Merge pages from multiple PDFs into one document", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDFs to merge (in order)
    ///
    /// Each input is a path, optionally followed by a page selector and an
    /// orientation: 'file.pdf', 'file.pdf=1,3,12-16' or 'file.pdf=all=L'.
    /// Paths may contain glob patterns, expanded in sorted order.
    ///
    /// Examples:
    ///   pdfweld a.pdf b.pdf -o out.pdf
    ///   pdfweld 'report.pdf=1-5' 'appendix.pdf=all=landscape' -o out.pdf
    ///   pdfweld 'chapters/*.pdf' -o book.pdf
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// Defaults to 'merged.pdf' in the current directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Page selector applied to inputs without their own (e.g. "1,3,12-16")
    ///
    /// Page numbers are 1-indexed and order-significant. Use 'all' for
    /// every page; that is also the default.
    #[arg(long, value_name = "PAGES")]
    pub pages: Option<String>,

    /// Default page orientation: portrait (P) or landscape (L)
    ///
    /// Landscape swaps the output page dimensions; content is never rotated
    /// or scaled. Inputs can override this per entry.
    #[arg(short = 'r', long, value_name = "ORIENTATION", default_value = "portrait")]
    pub orientation: String,

    /// Pad odd-length documents with a blank page for two-sided printing
    ///
    /// Every input that contributes an odd number of pages (except the
    /// last) is followed by one blank page, so the next document starts on
    /// a front side.
    #[arg(short, long)]
    pub duplex: bool,

    /// Disable the compatibility pass for inputs newer than the threshold
    ///
    /// By default, inputs declaring a PDF version above the threshold are
    /// rewritten through Ghostscript before merging.
    #[arg(long)]
    pub no_compat: bool,

    /// Ghostscript binary used by the compatibility pass
    ///
    /// Also settable through the GS_BINARY environment variable;
    /// defaults to 'gs' on the search path.
    #[arg(long, value_name = "PATH")]
    pub gs_binary: Option<PathBuf>,

    /// Highest PDF version accepted without rewriting (e.g. "1.4")
    #[arg(long, value_name = "VERSION", default_value = compat::DEFAULT_VERSION_THRESHOLD)]
    pub compat_threshold: String,

    /// Directory for intermediate files
    ///
    /// Defaults to a pdfweld subdirectory of the system temp directory.
    /// Intermediate files are removed when the merge finishes.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Number of inputs to read concurrently
    ///
    /// Default is the number of CPU cores.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Dry run - resolve and validate inputs without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the merge summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// One resolved input: a concrete path plus its per-input overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Path to the source PDF.
    pub path: PathBuf,
    /// Page selector from the input suffix, if any.
    pub selector: Option<PageSelector>,
    /// Orientation override from the input suffix, if any.
    pub orientation: Option<Orientation>,
}

impl Cli {
    /// Output path, defaulting to `merged.pdf`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::output::DEFAULT_FILE_NAME))
    }

    /// Merge options from the global flags.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidInput`] for an unknown orientation.
    pub fn merge_options(&self) -> Result<MergeOptions> {
        Ok(MergeOptions {
            orientation: Orientation::from_str(&self.orientation)?,
            duplex: self.duplex,
        })
    }

    /// Default selector from `--pages`, or `All`.
    pub fn default_selector(&self) -> Result<PageSelector> {
        match &self.pages {
            Some(spec) => PageSelector::parse(spec),
            None => Ok(PageSelector::All),
        }
    }

    /// Compatibility-pass settings from the relevant flags.
    pub fn compat_options(&self) -> CompatOptions {
        let mut options = CompatOptions {
            enabled: !self.no_compat,
            threshold: self.compat_threshold.clone(),
            ..CompatOptions::default()
        };
        if let Some(binary) = &self.gs_binary {
            options.binary = binary.clone();
        }
        options
    }

    /// Concurrency for reading inputs.
    pub fn effective_jobs(&self) -> usize {
        self.jobs
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
    }

    /// Parse and glob-expand the positional inputs, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidPageSelector`] or
    /// [`MergeError::InvalidInput`] for malformed suffixes,
    /// [`MergeError::InvalidInput`] for a bad glob pattern and
    /// [`MergeError::FileNotFound`] for a pattern matching nothing.
    pub fn input_specs(&self) -> Result<Vec<InputSpec>> {
        let mut specs = Vec::new();
        for input in &self.inputs {
            let (path_text, selector, orientation) = parse_input(input)?;
            if is_glob(&path_text) {
                for path in expand_glob(&path_text)? {
                    specs.push(InputSpec {
                        path,
                        selector: selector.clone(),
                        orientation,
                    });
                }
            } else {
                specs.push(InputSpec {
                    path: PathBuf::from(path_text),
                    selector,
                    orientation,
                });
            }
        }
        Ok(specs)
    }
}

/// Split an input argument into path, selector and orientation parts.
fn parse_input(input: &str) -> Result<(String, Option<PageSelector>, Option<Orientation>)> {
    let mut parts = input.splitn(3, '=');
    let path = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| MergeError::invalid_input(format!("input '{input}' has no path")))?;
    let selector = parts.next().map(PageSelector::parse).transpose()?;
    let orientation = parts.next().map(Orientation::from_str).transpose()?;
    Ok((path.to_string(), selector, orientation))
}

fn is_glob(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

/// Expand a glob pattern into sorted matching paths.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern)
        .map_err(|err| MergeError::invalid_input(format!("bad pattern '{pattern}': {err}")))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| MergeError::invalid_input(format!("pattern '{pattern}': {err}")))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(MergeError::FileNotFound {
            path: PathBuf::from(pattern),
        });
    }
    paths.sort();
    Ok(paths)
}
