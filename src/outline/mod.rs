//! Heading outline inference from font-size statistics.
//!
//! Processing runs in two phases per document:
//!
//! 1. [`aggregate`] flattens the page streams and builds the size histogram.
//! 2. [`classify`] tags fragments, [`merge`] joins them into heading blocks,
//!    and [`assemble`] resolves the title and orders the entries.
//!
//! Every step is pure and single-threaded; parallelism lives in the callers.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod merge;
mod options;

pub use aggregate::{aggregate, AggregatedDocument, SizeHistogram};
pub use assemble::assemble;
pub use classify::{classify, Classification, Veto};
pub use merge::{merge, HeadingLine};
pub use options::OutlineOptions;

use serde::Serialize;

use crate::model::{HeadingLevel, Outline, PageStream};

/// Font statistics gathered while building an outline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FontStats {
    /// Pages processed
    pub page_count: usize,
    /// Fragments kept after aggregation
    pub fragment_count: usize,
    /// Body text size
    pub body_size: Option<f32>,
    /// Heading sizes, largest first
    pub candidate_sizes: Vec<f32>,
    /// Size of the page-1 title fragments
    pub title_size: Option<f32>,
    /// (size, count) pairs, smallest size first
    pub histogram: Vec<(f32, usize)>,
    /// Fragments classified as TITLE or H1-H4
    pub heading_fragments: usize,
    /// Candidate fragments demoted by noise filters
    pub vetoed: usize,
    /// Blocks produced by the merger, title blocks included
    pub block_count: usize,
}

impl FontStats {
    /// Only one size present (or none larger than body): no headings possible.
    pub fn is_degenerate(&self) -> bool {
        self.fragment_count > 0 && self.candidate_sizes.is_empty()
    }
}

/// An outline together with the statistics that produced it.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub outline: Outline,
    pub stats: FontStats,
}

/// Build the outline of one document.
///
/// Total: empty or degenerate input yields an outline with no entries.
pub fn build_outline(
    pages: Vec<PageStream>,
    metadata_title: Option<&str>,
    options: &OutlineOptions,
) -> Outline {
    analyze(pages, metadata_title, options).outline
}

/// Build the outline of one document and report its font statistics.
pub fn analyze(
    pages: Vec<PageStream>,
    metadata_title: Option<&str>,
    options: &OutlineOptions,
) -> Analysis {
    let doc = aggregate(pages, options);
    let classification = classify(&doc, options);
    let blocks = merge(&doc.fragments, &classification.levels, options);

    let stats = FontStats {
        page_count: doc.page_count,
        fragment_count: doc.fragments.len(),
        body_size: classification.body_size,
        candidate_sizes: classification.candidate_sizes.clone(),
        title_size: classification.title_size,
        histogram: doc.histogram.iter().collect(),
        heading_fragments: classification
            .levels
            .iter()
            .filter(|l| **l != HeadingLevel::Body)
            .count(),
        vetoed: classification.vetoed,
        block_count: blocks.len(),
    };

    if stats.is_degenerate() {
        log::debug!("Single body size; document has no heading candidates");
    }

    let outline = assemble(blocks, metadata_title);
    log::debug!(
        "Outline: title {:?}, {} entries",
        outline.title,
        outline.len()
    );

    Analysis { outline, stats }
}
