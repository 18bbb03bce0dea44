//! Line and block merging for classified fragments.
//!
//! Heading text is often split into several fragments (style changes, kerning
//! runs) and several lines (wrapped titles). Fragments sharing a level are
//! first joined into lines, then consecutive lines into blocks. A BODY
//! fragment always ends both.

use crate::model::{BBox, Fragment, HeadingBlock, HeadingLevel};

use super::OutlineOptions;

/// A merged heading line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingLine {
    /// Line text in left-to-right order
    pub text: String,
    pub level: HeadingLevel,
    pub page: u32,
    /// Union of the member fragment boxes
    pub bbox: BBox,
    /// Largest member font size
    pub font_size: f32,
    /// Whether a BODY fragment came between this line and the previous one
    pub follows_body: bool,
}

/// Fragments collected for the line being built.
struct PendingLine<'a> {
    fragments: Vec<&'a Fragment>,
    level: HeadingLevel,
    bbox: BBox,
    follows_body: bool,
}

impl<'a> PendingLine<'a> {
    fn start(fragment: &'a Fragment, level: HeadingLevel, follows_body: bool) -> Self {
        Self {
            fragments: vec![fragment],
            level,
            bbox: fragment.bbox,
            follows_body,
        }
    }

    fn page(&self) -> u32 {
        self.fragments[0].page
    }

    fn accepts(&self, fragment: &Fragment, level: HeadingLevel, options: &OutlineOptions) -> bool {
        if fragment.page != self.page() || level != self.level {
            return false;
        }

        let shorter = self.bbox.height().min(fragment.bbox.height());
        if shorter <= 0.0 {
            return false;
        }
        let overlap = self.bbox.vertical_overlap(&fragment.bbox);
        if overlap <= shorter * options.line_overlap_ratio {
            return false;
        }

        let char_width = fragment.font_size * options.char_width_ratio;
        self.bbox.horizontal_gap(&fragment.bbox) < char_width * options.line_gap_factor
    }

    fn push(&mut self, fragment: &'a Fragment) {
        self.bbox = self.bbox.union(&fragment.bbox);
        self.fragments.push(fragment);
    }

    fn finish(mut self, options: &OutlineOptions) -> HeadingLine {
        self.fragments
            .sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let font_size = self
            .fragments
            .iter()
            .map(|f| f.font_size)
            .fold(0.0_f32, f32::max);

        HeadingLine {
            text: join_fragments(&self.fragments, options),
            level: self.level,
            page: self.page(),
            bbox: self.bbox,
            font_size,
            follows_body: self.follows_body,
        }
    }
}

/// Concatenate x-sorted fragments, inserting spaces at visible gaps.
fn join_fragments(fragments: &[&Fragment], options: &OutlineOptions) -> String {
    let mut result = String::new();

    for (i, fragment) in fragments.iter().enumerate() {
        if i == 0 {
            result.push_str(&fragment.text);
            continue;
        }

        let prev = fragments[i - 1];
        let gap = fragment.bbox.x0 - prev.bbox.x1;
        let char_width = fragment.font_size * options.char_width_ratio;
        let space_threshold = char_width * options.space_gap_factor;

        let prev_last = prev.text.chars().last();
        let curr_first = fragment.text.chars().next();

        let spaceless = prev_last.is_some_and(is_spaceless_script_char)
            && curr_first.is_some_and(is_spaceless_script_char);
        let has_space = prev_last.is_some_and(char::is_whitespace)
            || curr_first.is_some_and(char::is_whitespace);

        if gap > space_threshold && !spaceless && !has_space {
            result.push(' ');
        }
        result.push_str(&fragment.text);
    }

    result
}

/// Check if a character belongs to a script written without word spaces.
///
/// Chinese ideographs and Japanese kana qualify; Hangul does not, since
/// Korean separates words with spaces.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2A6DF).contains(&code)
    || (0x2A700..=0x2B73F).contains(&code)
    || (0x2B740..=0x2B81F).contains(&code)
    || (0x2B820..=0x2CEAF).contains(&code)
    || (0x2CEB0..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x309F).contains(&code)
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Join consecutive same-level fragments into heading lines.
///
/// `levels` is parallel to `fragments`. BODY fragments produce no line but
/// mark the next line as following body text.
pub fn merge_lines(
    fragments: &[Fragment],
    levels: &[HeadingLevel],
    options: &OutlineOptions,
) -> Vec<HeadingLine> {
    let mut lines = Vec::new();
    let mut current: Option<PendingLine<'_>> = None;
    let mut seen_body = false;

    for (fragment, &level) in fragments.iter().zip(levels) {
        if level == HeadingLevel::Body {
            if let Some(line) = current.take() {
                lines.push(line.finish(options));
            }
            seen_body = true;
            continue;
        }

        if let Some(line) = current.as_mut().filter(|l| l.accepts(fragment, level, options)) {
            line.push(fragment);
            continue;
        }

        if let Some(line) = current.take() {
            lines.push(line.finish(options));
        }
        current = Some(PendingLine::start(fragment, level, seen_body));
        seen_body = false;
    }

    if let Some(line) = current {
        lines.push(line.finish(options));
    }

    lines
}

fn continues_block(prev: &HeadingLine, next: &HeadingLine, options: &OutlineOptions) -> bool {
    if next.follows_body || next.page != prev.page || next.level != prev.level {
        return false;
    }
    if next.bbox.y0 <= prev.bbox.y0 {
        return false;
    }
    let gap = next.bbox.y0 - prev.bbox.y1;
    gap < options.block_gap_factor * prev.font_size.max(next.font_size)
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join consecutive wrapped lines into heading blocks.
pub fn merge_blocks(lines: Vec<HeadingLine>, options: &OutlineOptions) -> Vec<HeadingBlock> {
    let mut blocks = Vec::new();
    let mut group: Vec<HeadingLine> = Vec::new();

    for line in lines {
        let joins = group
            .last()
            .is_some_and(|prev| continues_block(prev, &line, options));
        if !joins && !group.is_empty() {
            blocks.push(finish_block(std::mem::take(&mut group)));
        }
        group.push(line);
    }
    if !group.is_empty() {
        blocks.push(finish_block(group));
    }

    blocks
}

fn finish_block(lines: Vec<HeadingLine>) -> HeadingBlock {
    let first = &lines[0];
    let left = lines
        .iter()
        .map(|l| l.bbox.x0)
        .fold(f32::INFINITY, f32::min);
    let text = collapse_whitespace(
        &lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    );

    if lines.len() > 1 {
        log::debug!(
            "Merged {} lines into {} block on page {}: {:?}",
            lines.len(),
            first.level,
            first.page,
            text
        );
    }

    HeadingBlock::new(text, first.level, first.page, first.bbox.y0, left)
}

/// Merge classified fragments into heading blocks (TITLE blocks included).
pub fn merge(
    fragments: &[Fragment],
    levels: &[HeadingLevel],
    options: &OutlineOptions,
) -> Vec<HeadingBlock> {
    let lines = merge_lines(fragments, levels, options);
    merge_blocks(lines, options)
}
