//! Directory batch processing.
//!
//! Every supported file in the input directory becomes one `<stem>.json`
//! outline in the output directory. Documents are processed on a bounded
//! [`TaskPool`]; a document that fails is logged and skipped, and the run
//! continues with the rest.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::detect::is_supported_path;
use crate::error::{Error, Result};
use crate::model::Outline;
use crate::outline::{build_outline, OutlineOptions};
use crate::parser::{open_source, ExtractOptions};
use crate::pool::TaskPool;
use crate::render::{to_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned for `.pdf` and `.layout` files
    pub input_dir: PathBuf,
    /// Directory receiving one JSON file per document
    pub output_dir: PathBuf,
    /// Worker threads (0 = available cores, at most 8)
    pub workers: usize,
    /// JSON layout of the output files
    pub json_format: JsonFormat,
    /// Classification and merge thresholds
    pub outline: OutlineOptions,
    /// Layout extraction settings
    pub extract: ExtractOptions,
}

impl BatchOptions {
    /// Create options for the given directories.
    ///
    /// Page extraction is lenient: unreadable pages are skipped.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            workers: 0,
            json_format: JsonFormat::Pretty,
            outline: OutlineOptions::default(),
            extract: ExtractOptions::default().lenient(),
        }
    }

    /// Set the worker count (0 selects the default).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the JSON output format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }

    /// Process documents and pages on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.workers = 1;
        self.extract = self.extract.sequential();
        self
    }

    /// Set the outline options.
    pub fn with_outline_options(mut self, options: OutlineOptions) -> Self {
        self.outline = options;
        self
    }

    /// Set the extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }
}

/// Outcome of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    /// Input file
    pub input: PathBuf,
    /// Output file (written only on success)
    pub output: PathBuf,
    /// Number of outline entries written
    pub entries: usize,
    /// Failure message when the document was skipped
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-document results in input order
    pub documents: Vec<DocumentReport>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.documents.len()
    }

    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }
}

/// List supported input files, sorted by name.
///
/// When two inputs share a stem (`a.layout` and `a.pdf`) only the first is
/// kept, since both would write `a.json`.
pub fn collect_inputs<P: AsRef<Path>>(input_dir: P) -> Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    if !input_dir.is_dir() {
        return Err(Error::InputNotFound(input_dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_supported_path(p))
        .collect();
    paths.sort();

    let mut stems = HashSet::new();
    paths.retain(|p| {
        let stem = p.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
        let first = stems.insert(stem);
        if !first {
            log::warn!("Skipping {}: another input has the same name", p.display());
        }
        first
    });

    Ok(paths)
}

/// Output path for an input file: `<output_dir>/<stem>.json`.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".json");
    output_dir.join(name)
}

/// Build the outline of one input file.
pub fn outline_file(
    path: &Path,
    extract: &ExtractOptions,
    options: &OutlineOptions,
    pool: &TaskPool,
) -> Result<Outline> {
    let source = open_source(path, extract)?;
    let pages = source.page_streams(pool)?;
    let title = source.metadata_title();
    Ok(build_outline(pages, title.as_deref(), options))
}

fn process_document(path: &Path, options: &BatchOptions, pool: &TaskPool) -> DocumentReport {
    let output = output_path(&options.output_dir, path);

    let result = outline_file(path, &options.extract, &options.outline, pool).and_then(|outline| {
        let json = to_json(&outline, options.json_format)?;
        fs::write(&output, json)?;
        Ok(outline.len())
    });

    match result {
        Ok(entries) => {
            log::info!("{} -> {} ({} entries)", path.display(), output.display(), entries);
            DocumentReport {
                input: path.to_path_buf(),
                output,
                entries,
                error: None,
            }
        }
        Err(e) => {
            log::warn!("Skipping {}: {}", path.display(), e);
            DocumentReport {
                input: path.to_path_buf(),
                output,
                entries: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Run a batch over the input directory.
///
/// Fails only when the input directory is missing or the output directory
/// cannot be created. An empty input directory is a successful run.
pub fn run_batch(options: &BatchOptions) -> Result<BatchReport> {
    run_batch_with_progress(options, |_| {})
}

/// Run a batch, calling `progress` as each document finishes.
pub fn run_batch_with_progress<F>(options: &BatchOptions, mut progress: F) -> Result<BatchReport>
where
    F: FnMut(&DocumentReport),
{
    let start = Instant::now();
    let inputs = collect_inputs(&options.input_dir)?;
    fs::create_dir_all(&options.output_dir)?;

    let pool = TaskPool::new(options.workers);
    log::info!(
        "Processing {} documents from {} with {} workers",
        inputs.len(),
        options.input_dir.display(),
        pool.workers()
    );

    let documents = pool.run_indexed_with(
        inputs,
        |path| process_document(&path, options, &pool),
        |_, report| progress(report),
    );

    let report = BatchReport {
        documents,
        elapsed: start.elapsed(),
    };
    log::info!(
        "Batch finished: {} written, {} skipped in {:.2?}",
        report.succeeded(),
        report.failed(),
        report.elapsed
    );

    Ok(report)
}
