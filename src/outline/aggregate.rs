//! Layout aggregation: flatten page streams and gather font-size statistics.
//!
//! This is the first of the two explicit phases. Nothing here decides a
//! heading level; it only produces the normalized fragment stream and the
//! document-wide histogram the classifier needs.

use std::collections::BTreeMap;

use crate::model::{round_font_size, size_from_key, size_key, Fragment, PageStream};

use super::OutlineOptions;

/// Font-size occurrence counts across a whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeHistogram {
    /// All fragments, keyed by size in tenths of a point
    all: BTreeMap<i32, usize>,
    /// Fragments long enough to vote on body size
    body: BTreeMap<i32, usize>,
}

impl SizeHistogram {
    /// Record one fragment.
    pub fn add(&mut self, fragment: &Fragment, min_body_tokens: usize) {
        let key = size_key(fragment.font_size);
        *self.all.entry(key).or_insert(0) += 1;
        if fragment.token_count() >= min_body_tokens {
            *self.body.entry(key).or_insert(0) += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Number of distinct sizes.
    pub fn distinct_count(&self) -> usize {
        self.all.len()
    }

    /// Occurrences of a size.
    pub fn count(&self, size: f32) -> usize {
        self.all.get(&size_key(size)).copied().unwrap_or(0)
    }

    /// All (size, count) pairs, smallest size first.
    pub fn iter(&self) -> impl Iterator<Item = (f32, usize)> + '_ {
        self.all.iter().map(|(k, v)| (size_from_key(*k), *v))
    }

    /// Body text size: the most frequent size among long fragments.
    ///
    /// Falls back to the most frequent size overall when no fragment is long
    /// enough. Ties go to the smaller size. `None` for an empty document.
    pub fn body_size(&self) -> Option<f32> {
        mode(&self.body).or_else(|| mode(&self.all)).map(size_from_key)
    }

    /// Distinct sizes strictly greater than `threshold`, largest first.
    pub fn sizes_above(&self, threshold: f32) -> Vec<f32> {
        let floor = size_key(threshold);
        self.all
            .keys()
            .rev()
            .filter(|k| **k > floor)
            .map(|k| size_from_key(*k))
            .collect()
    }
}

fn mode(counts: &BTreeMap<i32, usize>) -> Option<i32> {
    let mut best: Option<(i32, usize)> = None;
    for (&key, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

/// The normalized fragment stream of one document.
#[derive(Debug, Clone, Default)]
pub struct AggregatedDocument {
    /// Fragments in (page, emission) order
    pub fragments: Vec<Fragment>,
    /// Document-wide font-size histogram
    pub histogram: SizeHistogram,
    /// Height of each page, for margin bands
    pub page_heights: BTreeMap<u32, f32>,
    /// Number of pages seen, including pages without text
    pub page_count: usize,
}

impl AggregatedDocument {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Height of a page (0 when unknown).
    pub fn page_height(&self, page: u32) -> f32 {
        self.page_heights.get(&page).copied().unwrap_or(0.0)
    }
}

/// Flatten page streams into one ordered fragment sequence.
///
/// Pages are ordered by page number regardless of the order they arrive in.
/// Fragments with blank text or a non-positive size are dropped, sizes are
/// rounded, and each fragment's page is taken from its stream.
pub fn aggregate(mut pages: Vec<PageStream>, options: &OutlineOptions) -> AggregatedDocument {
    pages.sort_by_key(|p| p.number);

    if pages.len() > options.max_pages {
        log::warn!(
            "Document has {} pages; only the first {} are processed",
            pages.len(),
            options.max_pages
        );
        pages.truncate(options.max_pages);
    }

    let mut doc = AggregatedDocument {
        page_count: pages.len(),
        ..Default::default()
    };
    let mut dropped = 0usize;
    let mut truncated = false;

    for page in pages {
        let height = page.effective_height();
        doc.page_heights.insert(page.number, height);

        for mut fragment in page.fragments {
            if !fragment.is_meaningful() {
                dropped += 1;
                continue;
            }
            if doc.fragments.len() >= options.max_fragments {
                truncated = true;
                break;
            }
            fragment.page = page.number;
            fragment.font_size = round_font_size(fragment.font_size);
            doc.histogram.add(&fragment, options.min_body_tokens);
            doc.fragments.push(fragment);
        }
    }

    if truncated {
        log::warn!(
            "Fragment limit of {} reached; remaining text ignored",
            options.max_fragments
        );
    }

    log::debug!(
        "Aggregated {} fragments over {} pages ({} dropped, {} distinct sizes)",
        doc.fragments.len(),
        doc.page_count,
        dropped,
        doc.histogram.distinct_count()
    );

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    fn frag(text: &str, size: f32) -> Fragment {
        Fragment::new(text, size, 0, BBox::new(0.0, 0.0, 10.0, size))
    }

    #[test]
    fn test_body_size_ignores_short_fragments() {
        let mut hist = SizeHistogram::default();
        // A big title repeated as short tokens outnumbers the body text
        for _ in 0..10 {
            hist.add(&frag("Title", 24.0), 3);
        }
        for _ in 0..4 {
            hist.add(&frag("some body text here", 11.0), 3);
        }

        assert!((hist.body_size().unwrap() - 11.0).abs() < 0.01);
        assert_eq!(hist.count(24.0), 10);
    }

    #[test]
    fn test_body_size_falls_back_to_all_sizes() {
        let mut hist = SizeHistogram::default();
        hist.add(&frag("a", 10.0), 3);
        hist.add(&frag("b", 10.0), 3);
        hist.add(&frag("c", 18.0), 3);
        assert!((hist.body_size().unwrap() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_body_size_tie_prefers_smaller() {
        let mut hist = SizeHistogram::default();
        hist.add(&frag("one two three", 14.0), 3);
        hist.add(&frag("one two three", 10.0), 3);
        assert!((hist.body_size().unwrap() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_histogram() {
        let hist = SizeHistogram::default();
        assert!(hist.is_empty());
        assert_eq!(hist.body_size(), None);
        assert!(hist.sizes_above(0.0).is_empty());
    }

    #[test]
    fn test_sizes_above_descending() {
        let mut hist = SizeHistogram::default();
        for size in [12.0, 18.0, 14.0, 24.0, 12.0] {
            hist.add(&frag("x", size), 3);
        }
        let sizes = hist.sizes_above(12.0);
        assert_eq!(sizes.len(), 3);
        assert!((sizes[0] - 24.0).abs() < 0.01);
        assert!((sizes[2] - 14.0).abs() < 0.01);
    }

    #[test]
    fn test_aggregate_orders_pages_and_filters() {
        let mut p2 = PageStream::letter(2);
        p2.push(frag("second page", 12.0));
        let mut p1 = PageStream::letter(1);
        p1.push(frag("first page", 11.96));
        p1.push(frag("   ", 12.0));
        p1.push(frag("zero", 0.0));

        let doc = aggregate(vec![p2, p1], &OutlineOptions::default());
        assert_eq!(doc.fragments.len(), 2);
        assert_eq!(doc.fragments[0].text, "first page");
        assert_eq!(doc.fragments[0].page, 1);
        assert_eq!(doc.fragments[1].page, 2);
        assert!((doc.fragments[0].font_size - 12.0).abs() < 1e-4);
        assert_eq!(doc.histogram.count(12.0), 2);
        assert_eq!(doc.page_count, 2);
    }

    #[test]
    fn test_aggregate_empty_document() {
        let doc = aggregate(vec![PageStream::letter(1)], &OutlineOptions::default());
        assert!(doc.is_empty());
        assert!(doc.histogram.is_empty());
        assert_eq!(doc.page_count, 1);
    }

    #[test]
    fn test_aggregate_respects_limits() {
        let mut pages = Vec::new();
        for n in 1..=5 {
            let mut page = PageStream::letter(n);
            page.push(frag("a b c", 12.0));
            page.push(frag("d e f", 12.0));
            pages.push(page);
        }

        let options = OutlineOptions::default().with_limits(3, 5);
        let doc = aggregate(pages, &options);
        assert_eq!(doc.page_count, 3);
        assert_eq!(doc.fragments.len(), 5);
    }
}
