//! Heading classification from font-size statistics.
//!
//! Runs after aggregation, once the whole document has been seen: the body
//! size is the histogram mode, every distinct larger size is a heading
//! candidate, and candidate fragments then go through independent noise
//! vetoes before the page-1 title is tagged.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{size_key, Fragment, HeadingLevel};

use super::aggregate::AggregatedDocument;
use super::OutlineOptions;

/// Result of classifying one document's fragments.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// One level per fragment, parallel to the aggregated fragment stream
    pub levels: Vec<HeadingLevel>,
    /// Body text size (`None` for an empty document)
    pub body_size: Option<f32>,
    /// Candidate sizes, largest first (index = level rank)
    pub candidate_sizes: Vec<f32>,
    /// Size of the fragments tagged as title
    pub title_size: Option<f32>,
    /// Candidate fragments demoted by a noise filter
    pub vetoed: usize,
}

impl Classification {
    /// Heading level assigned to a candidate size, if any.
    pub fn level_for_size(&self, size: f32) -> Option<HeadingLevel> {
        let key = size_key(size);
        self.candidate_sizes
            .iter()
            .position(|s| size_key(*s) == key)
            .map(HeadingLevel::from_rank)
    }
}

/// Reason a candidate fragment was demoted to body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Veto {
    /// Same text in the same margin band on most pages
    RunningText,
    /// Digits, optionally wrapped in dashes or dots
    PageNumber,
    /// Too few characters to be a heading
    TooShort,
    /// URLs, e-mail addresses, dates, copyright lines and similar
    Boilerplate,
    /// Paragraph-shaped text: too long, too many words or several sentences
    NotHeadingLike,
}

/// Vertical margin band of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Band {
    Top,
    Bottom,
}

/// Text-only noise checks.
struct NoiseFilter {
    boilerplate: bool,
    heading_shape: bool,
    page_number_max_len: usize,
    min_chars: usize,
    max_chars: usize,
    max_words: usize,
}

fn page_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-–—.\s]*\d+[-–—.\s]*$").expect("page number pattern"))
}

fn boilerplate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(?:page\s+\d+|www\.|\d{1,2}:\d{2}|\d{1,2}/\d{1,2}/\d{2,4}|©|copyright\b|version\s+\d+)|^[^\w\s]+$|\S@\S|\.(?:com|org|net)\b",
        )
        .expect("boilerplate pattern")
    })
}

/// Sentence end followed by a capitalized word, as in running prose.
fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Ll}[.!?]\s+\p{Lu}").expect("sentence break pattern"))
}

fn page_counter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:page\s+)?\d+(?:\s*(?:of|/)\s*\d+)?$").expect("page counter pattern")
    })
}

impl NoiseFilter {
    fn new(options: &OutlineOptions) -> Self {
        Self {
            boilerplate: options.boilerplate_filter,
            heading_shape: options.heading_shape_filter,
            page_number_max_len: options.page_number_max_len,
            min_chars: options.min_heading_chars,
            max_chars: options.max_heading_chars,
            max_words: options.max_heading_words,
        }
    }

    fn check(&self, text: &str) -> Option<Veto> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();

        if len < self.min_chars {
            return Some(Veto::TooShort);
        }
        if len <= self.page_number_max_len && page_number_re().is_match(trimmed) {
            return Some(Veto::PageNumber);
        }
        if self.boilerplate && boilerplate_re().is_match(trimmed) {
            return Some(Veto::Boilerplate);
        }
        if self.heading_shape
            && (len > self.max_chars
                || trimmed.split_whitespace().count() > self.max_words
                || sentence_break_re().is_match(trimmed))
        {
            return Some(Veto::NotHeadingLike);
        }
        None
    }
}

/// Key used to recognize running text across pages.
///
/// NFKC, lowercased, whitespace collapsed. Page counters such as "Page 3 of
/// 10" additionally have their digits folded to `#` so every page shares one
/// key; any other text must match exactly.
pub fn running_text_key(text: &str) -> String {
    let normalized: String = text.nfkc().flat_map(char::to_lowercase).collect();
    let key = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if page_counter_re().is_match(&key) {
        key.chars()
            .map(|c| if c.is_ascii_digit() { '#' } else { c })
            .collect()
    } else {
        key
    }
}

fn band_of(fragment: &Fragment, page_height: f32, ratio: f32) -> Option<Band> {
    if page_height <= 0.0 {
        return None;
    }
    if fragment.bbox.y0 < page_height * ratio {
        Some(Band::Top)
    } else if fragment.bbox.y0 >= page_height * (1.0 - ratio) {
        Some(Band::Bottom)
    } else {
        None
    }
}

/// Per-document map from (band, normalized text) to the pages it occurs on.
#[derive(Default)]
struct RunningTextIndex {
    /// Key -> (last page seen, distinct page count)
    pages: HashMap<(Band, String), (u32, usize)>,
}

impl RunningTextIndex {
    fn build(
        doc: &AggregatedDocument,
        levels: &[HeadingLevel],
        options: &OutlineOptions,
    ) -> Self {
        let mut index = Self::default();
        for (fragment, level) in doc.fragments.iter().zip(levels) {
            if !level.is_heading() {
                continue;
            }
            let Some(band) = band_of(
                fragment,
                doc.page_height(fragment.page),
                options.margin_band_ratio,
            ) else {
                continue;
            };
            let entry = index
                .pages
                .entry((band, running_text_key(&fragment.text)))
                .or_insert((0, 0));
            if entry.0 != fragment.page {
                entry.0 = fragment.page;
                entry.1 += 1;
            }
        }
        index
    }

    fn is_running(
        &self,
        fragment: &Fragment,
        doc: &AggregatedDocument,
        options: &OutlineOptions,
    ) -> bool {
        let Some(band) = band_of(
            fragment,
            doc.page_height(fragment.page),
            options.margin_band_ratio,
        ) else {
            return false;
        };
        let min_pages = doc.page_count as f32 * options.running_text_page_ratio;
        self.pages
            .get(&(band, running_text_key(&fragment.text)))
            .is_some_and(|&(_, count)| count >= 2 && count as f32 > min_pages)
    }
}

/// Assign a heading level to every fragment of an aggregated document.
pub fn classify(doc: &AggregatedDocument, options: &OutlineOptions) -> Classification {
    let Some(body_size) = doc.histogram.body_size() else {
        return Classification {
            levels: vec![HeadingLevel::Body; doc.fragments.len()],
            ..Default::default()
        };
    };

    let candidate_sizes = doc.histogram.sizes_above(body_size);
    let level_map: HashMap<i32, HeadingLevel> = candidate_sizes
        .iter()
        .enumerate()
        .map(|(rank, size)| (size_key(*size), HeadingLevel::from_rank(rank)))
        .collect();

    let mut levels: Vec<HeadingLevel> = doc
        .fragments
        .iter()
        .map(|f| {
            level_map
                .get(&size_key(f.font_size))
                .copied()
                .unwrap_or(HeadingLevel::Body)
        })
        .collect();

    // First pass over candidates builds the running-text index; the second
    // applies every veto.
    let running = RunningTextIndex::build(doc, &levels, options);
    let noise = NoiseFilter::new(options);
    let mut vetoed = 0;

    for (fragment, level) in doc.fragments.iter().zip(levels.iter_mut()) {
        if !level.is_heading() {
            continue;
        }
        let veto = noise.check(&fragment.text).or_else(|| {
            running
                .is_running(fragment, doc, options)
                .then_some(Veto::RunningText)
        });
        if let Some(veto) = veto {
            log::debug!(
                "Demoted {:?} on page {} ({:?})",
                fragment.text,
                fragment.page,
                veto
            );
            *level = HeadingLevel::Body;
            vetoed += 1;
        }
    }

    let title_key = doc
        .fragments
        .iter()
        .zip(&levels)
        .filter(|(f, level)| f.page == 1 && level.is_heading())
        .map(|(f, _)| size_key(f.font_size))
        .max();

    if let Some(title_key) = title_key {
        for (fragment, level) in doc.fragments.iter().zip(levels.iter_mut()) {
            if fragment.page == 1 && level.is_heading() && size_key(fragment.font_size) == title_key
            {
                *level = HeadingLevel::Title;
            }
        }
    }

    log::debug!(
        "Body size {:.1}pt, {} candidate sizes, {} fragments vetoed",
        body_size,
        candidate_sizes.len(),
        vetoed
    );

    Classification {
        levels,
        body_size: Some(body_size),
        candidate_sizes,
        title_size: title_key.map(crate::model::size_from_key),
        vetoed,
    }
}
