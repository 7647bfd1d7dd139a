//! pdfweld command-line entry point.
//!
//! The binary is the async host around the synchronous merge engine: it
//! reads inputs concurrently, runs the compatibility pass, merges, and
//! writes the result.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use futures::stream::{self, StreamExt};

use pdfweld::cli::{Cli, InputSpec};
use pdfweld::compat;
use pdfweld::io::{ByteStore, FsStore, TempFiles};
use pdfweld::{MergeError, Merger, SourceDocument};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        let code = err
            .downcast_ref::<MergeError>()
            .map(MergeError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let specs = cli.input_specs()?;
    let options = cli.merge_options()?;
    let default_selector = cli.default_selector()?;
    let output_path = cli.output_path();

    let store: Arc<dyn ByteStore> = Arc::new(FsStore);
    let temp_root = cli
        .temp_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("pdfweld"));
    let mut temp = TempFiles::new(store.clone(), temp_root)?;
    let compat_options = cli.compat_options();

    if !cli.quiet && !cli.json {
        println!("Merging {} PDF inputs...", specs.len());
    }

    // Read every input with bounded concurrency; order is preserved.
    let reads: Vec<std::io::Result<Vec<u8>>> = stream::iter(specs.iter())
        .map(|spec| tokio::fs::read(&spec.path))
        .buffered(cli.effective_jobs())
        .collect()
        .await;

    let mut merger = Merger::new();
    for (spec, read) in specs.iter().zip(reads) {
        let bytes = read.map_err(|err| read_error(&spec.path, err))?;
        let source =
            load_source(&cli, &compat_options, store.as_ref(), &mut temp, spec, bytes).await?;
        let selector = spec
            .selector
            .clone()
            .unwrap_or_else(|| default_selector.clone());
        merger.add_source(source, selector, spec.orientation);
    }

    if cli.dry_run {
        if !cli.quiet && !cli.json {
            for entry in merger.entries() {
                println!(
                    "  {} ({} of {} pages)",
                    entry.label(),
                    entry.page_count(),
                    entry.source_page_count()
                );
            }
            println!("\n✓ Dry run completed successfully");
            println!("  Output would be: {}", output_path.display());
        }
        return Ok(());
    }

    let merged = merger.merge(&options)?;
    tokio::fs::write(&output_path, merged.as_bytes())
        .await
        .with_context(|| format!("writing {}", output_path.display()))?;

    if cli.json {
        let summary = merged.summary(&output_path);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !cli.quiet {
        let stats = merged.statistics();
        println!(
            "✓ Wrote {} ({} pages from {} sources, {})",
            output_path.display(),
            stats.pages_emitted,
            stats.sources,
            stats.format_output_size()
        );
        if stats.pad_pages > 0 {
            println!("  Inserted {} blank duplex pad page(s)", stats.pad_pages);
        }
    }

    Ok(())
}

fn read_error(path: &Path, err: std::io::Error) -> MergeError {
    match err.kind() {
        ErrorKind::NotFound => MergeError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => MergeError::io(path, err),
    }
}

/// Run one input through the compatibility pass and parse it.
async fn load_source(
    cli: &Cli,
    compat_options: &compat::CompatOptions,
    store: &dyn ByteStore,
    temp: &mut TempFiles,
    spec: &InputSpec,
    bytes: Vec<u8>,
) -> anyhow::Result<SourceDocument> {
    let label = spec.path.display().to_string();

    let needs_rewrite = compat_options.enabled
        && compat::declared_version(&bytes)
            .is_some_and(|version| compat::exceeds_threshold(version, &compat_options.threshold));
    let bytes = if needs_rewrite {
        let rewritten = compat::rewrite(compat_options, store, temp, &spec.path).await?;
        if !cli.quiet && !cli.json {
            println!(
                "  Rewrote {} to PDF {}",
                spec.path.display(),
                compat_options.threshold
            );
        }
        store.read(&rewritten)?
    } else {
        bytes
    };

    Ok(SourceDocument::from_bytes(&bytes, label)?)
}
