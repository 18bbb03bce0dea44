//! # pdf-outline
//!
//! Heading outline extraction for PDF documents.
//!
//! This library infers a document title and a nested H1-H4 heading outline
//! from the font sizes of a document's positioned text, without any
//! trained model.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_outline::{extract_outline, render, JsonFormat};
//!
//! fn main() -> pdf_outline::Result<()> {
//!     let outline = extract_outline("document.pdf")?;
//!     println!("{}", render::to_json(&outline, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Statistics, not models**: body size is the dominant font size,
//!   larger sizes rank as H1-H4
//! - **Noise filtering**: running headers/footers, page numbers, boilerplate
//! - **Line and block merging**: wrapped headings become one entry
//! - **Inputs**: PDF files (via `lopdf`) and JSON layout dumps
//! - **Parallel processing**: bounded Rayon pool for pages and batches

pub mod batch;
pub mod detect;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod pool;
pub mod render;

// Re-export commonly used types
pub use batch::{run_batch, BatchOptions, BatchReport, DocumentReport};
pub use detect::{detect_input, InputKind};
pub use error::{Error, Result};
pub use model::{BBox, Fragment, HeadingBlock, HeadingLevel, Outline, OutlineNode, PageStream};
pub use outline::{analyze, build_outline, Analysis, FontStats, OutlineOptions};
pub use parser::{open_source, ErrorMode, ExtractOptions, LayoutDump, LayoutSource};
pub use pool::TaskPool;
pub use render::JsonFormat;

use std::path::Path;

/// Extract the outline of a `.pdf` or `.layout` file.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// println!("{} ({} entries)", outline.title, outline.len());
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    OutlineExtractor::new().extract(path)
}

/// Extract an outline with custom options.
pub fn extract_outline_with_options<P: AsRef<Path>>(
    path: P,
    outline_options: &OutlineOptions,
    extract_options: &ExtractOptions,
) -> Result<Outline> {
    batch::outline_file(
        path.as_ref(),
        extract_options,
        outline_options,
        &TaskPool::default(),
    )
}

/// Build an outline from already-extracted page streams.
///
/// # Example
///
/// ```
/// use pdf_outline::{outline_from_pages, PageStream};
///
/// let outline = outline_from_pages(vec![PageStream::letter(1)], Some("Spec v2"));
/// assert_eq!(outline.title, "Spec v2");
/// assert!(outline.is_empty());
/// ```
pub fn outline_from_pages(pages: Vec<PageStream>, metadata_title: Option<&str>) -> Outline {
    build_outline(pages, metadata_title, &OutlineOptions::default())
}

/// Extract the outline of a file and serialize it to JSON.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::{to_json, JsonFormat};
///
/// let json = to_json("document.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let outline = extract_outline(path)?;
    render::to_json(&outline, format)
}

/// Builder for extracting outlines.
///
/// # Example
///
/// ```no_run
/// use pdf_outline::OutlineExtractor;
///
/// let outline = OutlineExtractor::new()
///     .lenient()
///     .with_boilerplate_filter(false)
///     .extract("document.pdf")?;
/// # Ok::<(), pdf_outline::Error>(())
/// ```
pub struct OutlineExtractor {
    extract_options: ExtractOptions,
    outline_options: OutlineOptions,
    workers: usize,
}

impl OutlineExtractor {
    /// Create a new extractor with default options.
    pub fn new() -> Self {
        Self {
            extract_options: ExtractOptions::default(),
            outline_options: OutlineOptions::default(),
            workers: 0,
        }
    }

    /// Skip unreadable pages instead of failing.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.extract_options = self.extract_options.sequential();
        self.workers = 1;
        self
    }

    /// Set the number of worker threads (0 selects the default).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable the boilerplate filter.
    pub fn with_boilerplate_filter(mut self, enabled: bool) -> Self {
        self.outline_options = self.outline_options.with_boilerplate_filter(enabled);
        self
    }

    /// Replace the outline options.
    pub fn with_outline_options(mut self, options: OutlineOptions) -> Self {
        self.outline_options = options;
        self
    }

    /// Replace the extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    fn pool(&self) -> TaskPool {
        if self.extract_options.parallel {
            TaskPool::new(self.workers)
        } else {
            TaskPool::sequential()
        }
    }

    /// Extract the outline of a file.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Outline> {
        Ok(self.analyze(path)?.outline)
    }

    /// Extract the outline of a file together with its font statistics.
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        let source = open_source(path, &self.extract_options)?;
        let pages = source.page_streams(&self.pool())?;
        let title = source.metadata_title();
        Ok(analyze(pages, title.as_deref(), &self.outline_options))
    }

    /// Read the page streams of a file without classifying them.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<LayoutDump> {
        let source = open_source(path, &self.extract_options)?;
        LayoutDump::from_source(source.as_ref(), &self.pool())
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new()
    }
}
