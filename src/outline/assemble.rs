//! Outline assembly: title resolution, title exclusion and final ordering.

use std::collections::HashSet;

use crate::model::{HeadingBlock, HeadingLevel, Outline};

use super::merge::collapse_whitespace;

/// Comparison key for title exclusion: whitespace collapsed, case-folded.
pub fn comparison_key(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Resolve the document title.
///
/// TITLE blocks win (joined with a space in document order), then a
/// non-blank metadata title taken verbatim, then the empty string.
pub fn resolve_title(blocks: &[HeadingBlock], metadata_title: Option<&str>) -> String {
    let title_texts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.level == HeadingLevel::Title)
        .map(|b| b.text.as_str())
        .collect();

    if !title_texts.is_empty() {
        return title_texts.join(" ");
    }

    match metadata_title {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => String::new(),
    }
}

/// Build the final outline from merged blocks.
pub fn assemble(blocks: Vec<HeadingBlock>, metadata_title: Option<&str>) -> Outline {
    let title = resolve_title(&blocks, metadata_title);

    let mut excluded: HashSet<String> = blocks
        .iter()
        .filter(|b| b.level == HeadingLevel::Title)
        .map(|b| comparison_key(&b.text))
        .collect();
    if !title.trim().is_empty() {
        excluded.insert(comparison_key(&title));
    }

    let mut entries: Vec<HeadingBlock> = blocks
        .into_iter()
        .filter(|b| b.level.is_heading() && !b.text.is_empty())
        .filter(|b| {
            let keep = !excluded.contains(&comparison_key(&b.text));
            if !keep {
                log::debug!("Dropped heading matching title on page {}: {:?}", b.page, b.text);
            }
            keep
        })
        .collect();

    entries.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.top.total_cmp(&b.top))
            .then(a.left.total_cmp(&b.left))
    });
    entries.dedup_by(|later, earlier| {
        later.page == earlier.page && later.top == earlier.top && later.left == earlier.left
    });

    Outline::new(title, entries)
}
