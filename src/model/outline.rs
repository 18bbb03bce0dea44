//! Outline types: heading levels, heading blocks, and the assembled outline.

use serde::{Deserialize, Serialize};

/// Classification assigned to a fragment.
///
/// Variants are ordered from the highest rank to the lowest, so
/// `HeadingLevel::H1 < HeadingLevel::H2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeadingLevel {
    /// Document title (largest size on page 1)
    Title,
    H1,
    H2,
    H3,
    H4,
    /// Regular body text
    Body,
}

impl HeadingLevel {
    /// Heading level for a position in the descending candidate-size list.
    ///
    /// Everything past the fourth candidate collapses into H4.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            2 => HeadingLevel::H3,
            _ => HeadingLevel::H4,
        }
    }

    /// Whether this is one of H1..H4.
    pub fn is_heading(self) -> bool {
        matches!(
            self,
            HeadingLevel::H1 | HeadingLevel::H2 | HeadingLevel::H3 | HeadingLevel::H4
        )
    }

    /// Numeric depth (1-4) for heading levels.
    pub fn depth(self) -> Option<u8> {
        match self {
            HeadingLevel::H1 => Some(1),
            HeadingLevel::H2 => Some(2),
            HeadingLevel::H3 => Some(3),
            HeadingLevel::H4 => Some(4),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::Title => "TITLE",
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::Body => "BODY",
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outline entry produced by merging fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingBlock {
    /// Merged, whitespace-normalized text
    pub text: String,
    /// Heading level
    pub level: HeadingLevel,
    /// Page of the first line (1-indexed)
    pub page: u32,
    /// Top edge of the first line
    #[serde(skip)]
    pub top: f32,
    /// Left edge of the block
    #[serde(skip)]
    pub left: f32,
}

impl HeadingBlock {
    /// Create a heading block at the given position.
    pub fn new(text: impl Into<String>, level: HeadingLevel, page: u32, top: f32, left: f32) -> Self {
        Self {
            text: text.into(),
            level,
            page,
            top,
            left,
        }
    }
}

/// The outline of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title (may be empty)
    pub title: String,

    /// Heading entries ordered by (page, top, left)
    #[serde(rename = "outline")]
    pub entries: Vec<HeadingBlock>,
}

impl Outline {
    /// Create an outline from a title and ordered entries.
    pub fn new(title: impl Into<String>, entries: Vec<HeadingBlock>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }

    /// Check if the outline has no heading entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of heading entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count entries at a given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }

    /// Build the nested view of the entries.
    ///
    /// Each entry becomes a child of the closest preceding entry with a
    /// higher rank; entries with no such predecessor are roots.
    pub fn to_tree(&self) -> Vec<OutlineNode> {
        let mut roots: Vec<OutlineNode> = Vec::new();
        let mut stack: Vec<OutlineNode> = Vec::new();

        for entry in &self.entries {
            let node = OutlineNode::from(entry);
            while stack.last().is_some_and(|top| top.level >= node.level) {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut roots, done);
                }
            }
            stack.push(node);
        }

        while let Some(done) = stack.pop() {
            attach(&mut stack, &mut roots, done);
        }

        roots
    }
}

fn attach(stack: &mut [OutlineNode], roots: &mut Vec<OutlineNode>, node: OutlineNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// A node of the nested outline view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub text: String,
    pub level: HeadingLevel,
    pub page: u32,
    /// Child entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Count this node and all of its descendants.
    pub fn total_items(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::total_items).sum::<usize>()
    }
}

impl From<&HeadingBlock> for OutlineNode {
    fn from(block: &HeadingBlock) -> Self {
        Self {
            text: block.text.clone(),
            level: block.level,
            page: block.page,
            children: Vec::new(),
        }
    }
}
