//! Layout sources: where a document's page streams come from.
//!
//! The outline pipeline only needs ordered [`PageStream`]s and an optional
//! metadata title. [`PdfSource`] produces them from a PDF with `lopdf`;
//! [`LayoutDumpSource`] reads them from a JSON layout dump written by
//! another extractor (or by `pdf-outline dump`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detect::{detect_input, InputKind};
use crate::error::{Error, Result};
use crate::model::PageStream;
use crate::pool::TaskPool;

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::extract::{interpret_page, RawPage};
use super::options::{ErrorMode, ExtractOptions};

/// Fallback page size (US Letter) when a page has no usable MediaBox.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// External layout collaborator for one document.
pub trait LayoutSource {
    /// The document's metadata title, if any.
    fn metadata_title(&self) -> Option<String>;

    /// Page streams in page order.
    ///
    /// `pool` may be used to process pages in parallel.
    fn page_streams(&self, pool: &TaskPool) -> Result<Vec<PageStream>>;
}

/// Serialized page streams of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDump {
    /// Metadata title
    #[serde(default)]
    pub title: Option<String>,
    /// Page streams
    #[serde(default)]
    pub pages: Vec<PageStream>,
}

impl LayoutDump {
    /// Create a dump from a title and page streams.
    pub fn new(title: Option<String>, pages: Vec<PageStream>) -> Self {
        Self { title, pages }
    }

    /// Read everything a source provides into a dump.
    pub fn from_source(source: &dyn LayoutSource, pool: &TaskPool) -> Result<Self> {
        Ok(Self::new(source.metadata_title(), source.page_streams(pool)?))
    }

    /// Parse a dump from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a dump from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize the dump as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
    }
}

/// A layout source backed by a [`LayoutDump`].
#[derive(Debug, Clone)]
pub struct LayoutDumpSource {
    dump: LayoutDump,
}

impl LayoutDumpSource {
    /// Open a `.layout` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_dump(LayoutDump::load(path)?))
    }

    /// Wrap an in-memory dump.
    pub fn from_dump(dump: LayoutDump) -> Self {
        Self { dump }
    }
}

impl LayoutSource for LayoutDumpSource {
    fn metadata_title(&self) -> Option<String> {
        self.dump.title.clone()
    }

    fn page_streams(&self, _pool: &TaskPool) -> Result<Vec<PageStream>> {
        Ok(self.dump.pages.clone())
    }
}

/// A layout source that decodes a PDF.
pub struct PdfSource {
    backend: LopdfBackend,
    options: ExtractOptions,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            backend: LopdfBackend::load_file(path)?,
            options,
        })
    }

    /// Load a PDF from memory.
    pub fn from_bytes(data: &[u8], options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            backend: LopdfBackend::load_bytes(data)?,
            options,
        })
    }

    /// PDF version from the file header.
    pub fn version(&self) -> String {
        self.backend.version()
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Extract a single page by its 1-indexed number.
    pub fn page_stream(&self, number: u32) -> Result<PageStream> {
        let id = self.backend.page_id(number)?;
        interpret_page(&self.read_page(number, id)?)
    }

    /// Copy one page's fonts, geometry and content out of the document.
    fn read_page(&self, number: u32, id: PageId) -> Result<RawPage> {
        let (width, height) = self.backend.page_dimensions(id).unwrap_or_else(|e| {
            log::debug!("Page {}: {}; assuming US Letter", number, e);
            DEFAULT_PAGE_SIZE
        });

        Ok(RawPage {
            number,
            width,
            height,
            fonts: self.backend.page_fonts(id)?,
            content: self.backend.page_content(id)?,
        })
    }

    /// Apply the error mode to a failed page.
    fn page_failed(&self, number: u32, err: Error, failed: &mut usize) -> Result<()> {
        match self.options.error_mode {
            ErrorMode::Strict => Err(err),
            ErrorMode::Lenient => {
                log::warn!("Skipping page {}: {}", number, err);
                *failed += 1;
                Ok(())
            }
        }
    }
}

impl LayoutSource for PdfSource {
    fn metadata_title(&self) -> Option<String> {
        self.backend.metadata_title()
    }

    fn page_streams(&self, pool: &TaskPool) -> Result<Vec<PageStream>> {
        let pages = self.backend.pages();
        let total = pages.len();
        if total > self.options.max_pages {
            log::warn!(
                "Document has {} pages; only the first {} are read",
                total,
                self.options.max_pages
            );
        }

        // lopdf access stays on this thread; only owned page data is shared
        let mut raw_pages = Vec::with_capacity(total.min(self.options.max_pages));
        let mut failed = 0usize;
        for (number, id) in pages.into_iter().take(self.options.max_pages) {
            match self.read_page(number, id) {
                Ok(raw) => raw_pages.push(raw),
                Err(e) => self.page_failed(number, e, &mut failed)?,
            }
        }

        let sequential = TaskPool::sequential();
        let pool = if self.options.parallel { pool } else { &sequential };
        let interpreted = pool.run_indexed(raw_pages, |raw| (raw.number, interpret_page(&raw)));

        let mut streams = Vec::with_capacity(interpreted.len());
        for (number, result) in interpreted {
            match result {
                Ok(stream) => streams.push(stream),
                Err(e) => self.page_failed(number, e, &mut failed)?,
            }
        }

        if streams.is_empty() && failed > 0 {
            return Err(Error::UnreadableDocument(format!(
                "none of {} pages could be read",
                failed
            )));
        }

        log::debug!(
            "Read {} pages ({} skipped, {} fragments)",
            streams.len(),
            failed,
            streams.iter().map(|s| s.fragments.len()).sum::<usize>()
        );

        Ok(streams)
    }
}

/// Open a layout source for a `.pdf` or `.layout` file.
pub fn open_source<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Box<dyn LayoutSource>> {
    let path = path.as_ref();
    match detect_input(path)? {
        InputKind::Layout => Ok(Box::new(LayoutDumpSource::open(path)?)),
        InputKind::Pdf { version } => {
            log::debug!("Opening {} (PDF {})", path.display(), version);
            Ok(Box::new(PdfSource::open(path, options.clone())?))
        }
    }
}
