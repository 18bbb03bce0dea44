//! Rendering module for converting outlines to output formats.

mod json;
mod text;

pub use json::{to_json, to_json_tree, JsonFormat};
pub use text::to_text;
