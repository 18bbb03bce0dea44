//! Plain text rendering for outlines.

use crate::model::Outline;

/// Render an outline as indented text, one entry per line.
///
/// Entries are indented two spaces per level below H1 and followed by their
/// page number.
pub fn to_text(outline: &Outline) -> String {
    let mut output = String::new();

    if !outline.title.is_empty() {
        output.push_str(outline.title.trim());
        output.push('\n');
    }

    for entry in &outline.entries {
        let depth = entry.level.depth().unwrap_or(1) as usize;
        output.push_str(&"  ".repeat(depth - 1));
        output.push_str(&entry.text);
        output.push_str(&format!(" ... {}\n", entry.page));
    }

    output
}
