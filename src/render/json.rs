//! JSON rendering for outlines.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Outline, OutlineNode};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Nested view of an outline, serialized with the same top-level fields.
#[derive(Debug, Serialize)]
struct TreeDocument<'a> {
    title: &'a str,
    outline: Vec<OutlineNode>,
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert an outline to JSON (`{"title": ..., "outline": [...]}`).
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    serialize(outline, format)
}

/// Convert an outline to JSON with entries nested under their parents.
pub fn to_json_tree(outline: &Outline, format: JsonFormat) -> Result<String> {
    let tree = TreeDocument {
        title: &outline.title,
        outline: outline.to_tree(),
    };
    serialize(&tree, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingBlock, HeadingLevel};

    fn sample() -> Outline {
        Outline::new(
            "Guide",
            vec![
                HeadingBlock::new("Intro", HeadingLevel::H1, 1, 100.0, 72.0),
                HeadingBlock::new("Scope", HeadingLevel::H2, 2, 80.0, 72.0),
            ],
        )
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Guide\""));
        assert!(json.contains("\"level\": \"H2\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&Outline::default(), JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"{"title":"","outline":[]}"#);
    }

    #[test]
    fn test_to_json_tree() {
        let json = to_json_tree(&sample(), JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Guide","outline":[{"text":"Intro","level":"H1","page":1,"children":[{"text":"Scope","level":"H2","page":2}]}]}"#
        );
    }
}
