//! Input format detection.
//!
//! Batch input directories may hold PDFs and JSON layout dumps side by side.
//! Files are first selected by extension, then confirmed by their leading
//! bytes before any decoder sees them.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// File extension for PDF documents.
pub const PDF_EXTENSION: &str = "pdf";

/// File extension for JSON layout dumps.
pub const LAYOUT_EXTENSION: &str = "layout";

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Detected kind of an input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// A PDF file with its header version (e.g., "1.7").
    Pdf { version: String },
    /// A JSON layout dump of already-extracted page streams.
    Layout,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Pdf { version } => write!(f, "PDF {}", version),
            InputKind::Layout => write!(f, "layout dump"),
        }
    }
}

/// Check whether a path has an extension the batch runner accepts.
pub fn is_supported_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PDF_EXTENSION) || e.eq_ignore_ascii_case(LAYOUT_EXTENSION))
        .unwrap_or(false)
}

/// Detect the input kind of a file from its extension and header bytes.
pub fn detect_input<P: AsRef<Path>>(path: P) -> Result<InputKind> {
    let path = path.as_ref();
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;

    let is_layout = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(LAYOUT_EXTENSION))
        .unwrap_or(false);

    if is_layout {
        return match header.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => Ok(InputKind::Layout),
            _ => Err(Error::InvalidLayout(format!(
                "{} does not contain a JSON object",
                path.display()
            ))),
        };
    }

    detect_pdf_from_bytes(&header)
}

/// Detect a PDF header in the given bytes.
///
/// Returns `Error::UnknownFormat` when the magic bytes are missing and
/// `Error::UnsupportedVersion` when the version field is malformed.
pub fn detect_pdf_from_bytes(data: &[u8]) -> Result<InputKind> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(InputKind::Pdf { version })
}

/// Check if a version string looks like "1.7".
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_valid_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        let kind = detect_pdf_from_bytes(data).unwrap();
        assert_eq!(
            kind,
            InputKind::Pdf {
                version: "1.7".to_string()
            }
        );
        assert_eq!(kind.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_pdf_from_bytes(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_too_short() {
        let result = detect_pdf_from_bytes(b"%PDF");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_bad_version() {
        let result = detect_pdf_from_bytes(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(_))));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("10.0"));
        assert!(!is_valid_version("abc"));
    }

    #[test]
    fn test_supported_paths() {
        assert!(is_supported_path("a/report.pdf"));
        assert!(is_supported_path("a/report.PDF"));
        assert!(is_supported_path("a/report.layout"));
        assert!(!is_supported_path("a/report.json"));
        assert!(!is_supported_path("a/README"));
    }

    #[test]
    fn test_detect_layout_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.layout");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "  {{\"pages\": []}}").unwrap();

        assert_eq!(detect_input(&path).unwrap(), InputKind::Layout);
    }

    #[test]
    fn test_detect_layout_file_not_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.layout");
        std::fs::write(&path, "%PDF-1.4").unwrap();

        assert!(matches!(detect_input(&path), Err(Error::InvalidLayout(_))));
    }
}
