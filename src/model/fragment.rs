//! Positioned text fragments and per-page streams.

use serde::{Deserialize, Serialize};

/// Precision (in points) that font sizes are rounded to.
pub const FONT_SIZE_PRECISION: f32 = 0.1;

/// Round a font size to [`FONT_SIZE_PRECISION`].
pub fn round_font_size(size: f32) -> f32 {
    (size / FONT_SIZE_PRECISION).round() * FONT_SIZE_PRECISION
}

/// Integer histogram key for a font size (tenths of a point).
pub(crate) fn size_key(size: f32) -> i32 {
    (size / FONT_SIZE_PRECISION).round() as i32
}

/// Font size for a histogram key.
pub(crate) fn size_from_key(key: i32) -> f32 {
    key as f32 * FONT_SIZE_PRECISION
}

/// Axis-aligned bounding box. Y grows downward from the top of the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a box, normalizing the corner order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Length of the shared vertical range (0 when disjoint).
    pub fn vertical_overlap(&self, other: &BBox) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Horizontal distance between the boxes (0 when they overlap).
    pub fn horizontal_gap(&self, other: &BBox) -> f32 {
        (self.x0.max(other.x0) - self.x1.min(other.x1)).max(0.0)
    }
}

/// One contiguous run of text sharing a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    #[serde(default)]
    pub bold: bool,
    /// Whether the font appears to be italic
    #[serde(default)]
    pub italic: bool,
    /// Font name (e.g., "Helvetica-Bold"); used for grouping only
    #[serde(default)]
    pub font_name: String,
    /// Page number (1-indexed); assigned from the owning page stream
    #[serde(default)]
    pub page: u32,
    /// Bounding box in page space, y down
    pub bbox: BBox,
}

impl Fragment {
    /// Create a new fragment with no font name and a regular style.
    pub fn new(text: impl Into<String>, font_size: f32, page: u32, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            font_size,
            bold: false,
            italic: false,
            font_name: String::new(),
            page,
            bbox,
        }
    }

    /// Set the font name and infer bold/italic flags from it.
    pub fn with_font(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        let lower = self.font_name.to_lowercase();
        self.bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        self.italic = lower.contains("italic") || lower.contains("oblique");
        self
    }

    /// Override the style flags.
    pub fn with_style(mut self, bold: bool, italic: bool) -> Self {
        self.bold = bold;
        self.italic = italic;
        self
    }

    /// Number of whitespace-separated tokens.
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether the fragment carries any classification signal.
    pub fn is_meaningful(&self) -> bool {
        !self.text.trim().is_empty() && self.font_size.is_finite() && self.font_size > 0.0
    }
}

/// Fragments of one page, in the order the layout engine emitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStream {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points (0 if unknown)
    #[serde(default)]
    pub width: f32,
    /// Page height in points (0 if unknown)
    #[serde(default)]
    pub height: f32,
    /// Fragments in emission order
    #[serde(default)]
    pub fragments: Vec<Fragment>,
}

impl PageStream {
    /// Create an empty page stream.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            fragments: Vec::new(),
        }
    }

    /// Create a US Letter page (612x792 points).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Append a fragment.
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Page height, falling back to the lowest fragment edge when unknown.
    pub fn effective_height(&self) -> f32 {
        if self.height > 0.0 {
            return self.height;
        }
        self.fragments
            .iter()
            .map(|f| f.bbox.y1)
            .fold(0.0_f32, f32::max)
    }
}
