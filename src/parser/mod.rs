//! Layout extraction: PDF decoding and layout dumps.

pub mod backend;
pub mod extract;
mod options;
mod source;

pub use backend::{LopdfBackend, PdfBackend};
pub use extract::{interpret_page, RawPage};
pub use options::{ErrorMode, ExtractOptions};
pub use source::{open_source, LayoutDump, LayoutDumpSource, LayoutSource, PdfSource};
