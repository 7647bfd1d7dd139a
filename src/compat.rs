//! Compatibility rewriting of newer-than-supported inputs.
//!
//! Inputs declaring a PDF version above the configured threshold are passed
//! through an external Ghostscript-compatible rewriter before parsing. The
//! rewritten copy lands in the merge's temp directory and is registered with
//! [`TempFiles`], so it disappears when the merge scope ends. Files at or
//! below the threshold are returned untouched.
//!
//! The binary defaults to `gs` on the search path and can be overridden via
//! the `GS_BINARY` environment variable or explicitly in [`CompatOptions`].

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::{MergeError, Result};
use crate::io::{ByteStore, TempFiles};

/// Highest PDF header version accepted without rewriting.
pub const DEFAULT_VERSION_THRESHOLD: &str = "1.4";

/// Environment variable overriding the rewriter binary.
pub const GS_BINARY_ENV: &str = "GS_BINARY";

/// Settings for the compatibility pass.
#[derive(Debug, Clone)]
pub struct CompatOptions {
    /// Whether the pass runs at all.
    pub enabled: bool,
    /// Version threshold, e.g. `"1.4"`.
    pub threshold: String,
    /// Rewriter binary to invoke.
    pub binary: PathBuf,
}

impl Default for CompatOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_VERSION_THRESHOLD.to_string(),
            binary: default_binary(),
        }
    }
}

impl CompatOptions {
    /// Options with the pass switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

fn default_binary() -> PathBuf {
    std::env::var_os(GS_BINARY_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("gs"))
}

/// Extract the version from a `%PDF-x.y` header.
pub fn declared_version(bytes: &[u8]) -> Option<&str> {
    let rest = bytes.strip_prefix(b"%PDF-")?;
    let end = rest
        .iter()
        .position(|b| !b.is_ascii_digit() && *b != b'.')
        .unwrap_or(rest.len());
    let version = std::str::from_utf8(&rest[..end]).ok()?;
    if version.is_empty() { None } else { Some(version) }
}

/// Whether `version` is numerically newer than `threshold` (both `x.y`).
/// Unparseable versions count as newer, so they get rewritten rather than
/// fed to the parser as-is.
pub fn exceeds_threshold(version: &str, threshold: &str) -> bool {
    match (parse_version(version), parse_version(threshold)) {
        (Some(v), Some(t)) => v > t,
        _ => true,
    }
}

fn parse_version(text: &str) -> Option<(u32, u32)> {
    let (major, minor) = text.trim().split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Rewrite `path` to the threshold version when its header exceeds it.
///
/// Returns the path to read the document from: the original when no rewrite
/// was needed, otherwise a fresh temp file registered in `temp`.
///
/// # Errors
///
/// Returns [`MergeError::MalformedDocument`] when the rewriter fails or
/// produces no output, and store errors from reading the header.
pub async fn downgrade_if_needed(
    options: &CompatOptions,
    store: &dyn ByteStore,
    temp: &mut TempFiles,
    path: &Path,
) -> Result<PathBuf> {
    if !options.enabled {
        return Ok(path.to_path_buf());
    }
    let bytes = store.read(path)?;
    let Some(version) = declared_version(&bytes) else {
        // No readable header; let the parser produce the real diagnosis.
        return Ok(path.to_path_buf());
    };
    if !exceeds_threshold(version, &options.threshold) {
        return Ok(path.to_path_buf());
    }
    rewrite(options, store, temp, path).await
}

/// Run the rewriter unconditionally, returning the rewritten temp path.
///
/// Callers that already sniffed the header (see [`declared_version`] and
/// [`exceeds_threshold`]) use this directly to avoid reading the file twice.
pub async fn rewrite(
    options: &CompatOptions,
    store: &dyn ByteStore,
    temp: &mut TempFiles,
    path: &Path,
) -> Result<PathBuf> {
    let rewritten = temp.reserve(".pdf");
    let status = Command::new(&options.binary)
        .arg("-dBATCH")
        .arg("-dNOPAUSE")
        .arg("-q")
        .arg("-sDEVICE=pdfwrite")
        .arg(format!("-dCompatibilityLevel={}", options.threshold))
        .arg(format!("-sOutputFile={}", rewritten.display()))
        .arg(path)
        .status()
        .await
        .map_err(|err| {
            MergeError::malformed(
                path.display().to_string(),
                format!(
                    "could not run version rewriter '{}': {err}",
                    options.binary.display()
                ),
            )
        })?;

    if !status.success() {
        return Err(MergeError::malformed(
            path.display().to_string(),
            format!("version rewriter exited with {status}"),
        ));
    }
    if !store.exists(&rewritten) {
        return Err(MergeError::malformed(
            path.display().to_string(),
            "version rewriter produced no output",
        ));
    }
    Ok(rewritten)
}
