//! Document model types for outline extraction.
//!
//! Fragments and page streams are the input side (what a layout extractor
//! produces); heading blocks and outlines are the output side.

mod fragment;
mod outline;

pub use fragment::{round_font_size, BBox, Fragment, PageStream, FONT_SIZE_PRECISION};
pub(crate) use fragment::{size_from_key, size_key};
pub use outline::{HeadingBlock, HeadingLevel, Outline, OutlineNode};
