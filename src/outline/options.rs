//! Outline extraction options and thresholds.

/// Options controlling heading classification and merging.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Minimum whitespace-separated tokens for a fragment to vote on body size
    pub min_body_tokens: usize,

    /// Fraction of the page height treated as the top/bottom margin band
    pub margin_band_ratio: f32,

    /// A running-text key must appear on more than this fraction of pages
    pub running_text_page_ratio: f32,

    /// Maximum length of a page-number-like fragment
    pub page_number_max_len: usize,

    /// Minimum characters (after trimming) for a heading fragment
    pub min_heading_chars: usize,

    /// Maximum characters for a heading fragment
    pub max_heading_chars: usize,

    /// Maximum whitespace-separated words for a heading fragment
    pub max_heading_words: usize,

    /// Also veto boilerplate such as URLs, e-mail addresses, dates and copyright lines
    pub boilerplate_filter: bool,

    /// Veto paragraph-shaped candidates: over-long text or several sentences
    pub heading_shape_filter: bool,

    /// Average character width as a fraction of the font size
    pub char_width_ratio: f32,

    /// Fragments join a line when their gap is below this many character widths
    pub line_gap_factor: f32,

    /// Minimum vertical overlap (fraction of the shorter box) for one line
    pub line_overlap_ratio: f32,

    /// A space is inserted when the gap exceeds this many character widths
    pub space_gap_factor: f32,

    /// Lines join a block when their gap is below this many font sizes
    pub block_gap_factor: f32,

    /// Maximum pages processed per document
    pub max_pages: usize,

    /// Maximum fragments processed per document
    pub max_fragments: usize,
}

impl OutlineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body-size token threshold.
    pub fn with_min_body_tokens(mut self, tokens: usize) -> Self {
        self.min_body_tokens = tokens;
        self
    }

    /// Set the margin band ratio used for running headers/footers.
    pub fn with_margin_band_ratio(mut self, ratio: f32) -> Self {
        self.margin_band_ratio = ratio;
        self
    }

    /// Enable or disable the boilerplate filter.
    pub fn with_boilerplate_filter(mut self, enabled: bool) -> Self {
        self.boilerplate_filter = enabled;
        self
    }

    /// Enable or disable the paragraph-shape filter.
    pub fn with_heading_shape_filter(mut self, enabled: bool) -> Self {
        self.heading_shape_filter = enabled;
        self
    }

    /// Set the maximum heading length in characters and words.
    pub fn with_max_heading_len(mut self, chars: usize, words: usize) -> Self {
        self.max_heading_chars = chars;
        self.max_heading_words = words;
        self
    }

    /// Set the block merge threshold (multiple of font size).
    pub fn with_block_gap_factor(mut self, factor: f32) -> Self {
        self.block_gap_factor = factor;
        self
    }

    /// Set the per-document page and fragment bounds.
    pub fn with_limits(mut self, max_pages: usize, max_fragments: usize) -> Self {
        self.max_pages = max_pages;
        self.max_fragments = max_fragments;
        self
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            min_body_tokens: 3,
            margin_band_ratio: 0.1,
            running_text_page_ratio: 0.5,
            page_number_max_len: 5,
            min_heading_chars: 2,
            max_heading_chars: 100,
            max_heading_words: 20,
            boilerplate_filter: true,
            heading_shape_filter: true,
            char_width_ratio: 0.5,
            line_gap_factor: 3.0,
            line_overlap_ratio: 0.5,
            space_gap_factor: 0.2,
            block_gap_factor: 1.5,
            max_pages: 2_000,
            max_fragments: 500_000,
        }
    }
}
