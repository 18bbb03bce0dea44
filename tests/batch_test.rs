//! Batch runner tests over temporary directories.

use std::fs;
use std::path::Path;

use pdf_outline::batch::run_batch_with_progress;
use pdf_outline::{
    run_batch, BBox, BatchOptions, Error, Fragment, HeadingLevel, LayoutDump, Outline, PageStream,
};
use tempfile::TempDir;

fn frag(text: &str, size: f32, y: f32) -> Fragment {
    let width = text.chars().count() as f32 * size * 0.5;
    Fragment::new(text, size, 0, BBox::new(72.0, y, 72.0 + width, y + size))
}

fn layout(title: &str, heading: &str) -> LayoutDump {
    let mut page = PageStream::letter(1);
    page.push(frag(title, 26.0, 80.0));
    page.push(frag(heading, 18.0, 160.0));
    for i in 0..8 {
        page.push(frag(
            "ordinary body text on the page",
            10.0,
            200.0 + i as f32 * 13.0,
        ));
    }
    LayoutDump::new(Some("metadata title".to_string()), vec![page])
}

fn write_layout(dir: &Path, name: &str, dump: &LayoutDump) {
    fs::write(dir.join(name), dump.to_json().unwrap()).unwrap();
}

fn read_outline(path: &Path) -> Outline {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn setup() -> (TempDir, TempDir) {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_layout(input.path(), "alpha.layout", &layout("Alpha Guide", "Installation"));
    write_layout(input.path(), "beta.layout", &layout("Beta Notes", "Changes"));
    fs::write(input.path().join("broken.pdf"), b"this is not a pdf").unwrap();
    fs::write(input.path().join("bad.layout"), b"{ \"pages\": [ oops").unwrap();
    fs::write(input.path().join("readme.txt"), b"ignored").unwrap();

    (input, output)
}

#[test]
fn test_batch_writes_one_file_per_document() {
    let (input, output) = setup();

    let options = BatchOptions::new(input.path(), output.path()).with_workers(2);
    let report = run_batch(&options).unwrap();

    assert_eq!(report.total(), 4);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 2);

    let alpha = read_outline(&output.path().join("alpha.json"));
    assert_eq!(alpha.title, "Alpha Guide");
    assert_eq!(alpha.entries.len(), 1);
    assert_eq!(alpha.entries[0].text, "Installation");
    assert_eq!(alpha.entries[0].level, HeadingLevel::H2);

    let beta = read_outline(&output.path().join("beta.json"));
    assert_eq!(beta.title, "Beta Notes");

    // Failed documents leave no output behind
    assert!(!output.path().join("broken.json").exists());
    assert!(!output.path().join("bad.json").exists());
    assert!(!output.path().join("readme.json").exists());
}

#[test]
fn test_batch_reports_in_input_order() {
    let (input, output) = setup();

    let report = run_batch(&BatchOptions::new(input.path(), output.path())).unwrap();
    let names: Vec<String> = report
        .documents
        .iter()
        .map(|d| d.input.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["alpha.layout", "bad.layout", "beta.layout", "broken.pdf"]
    );

    let failed: Vec<_> = report.documents.iter().filter(|d| !d.is_success()).collect();
    assert!(failed.iter().all(|d| d.error.is_some() && d.entries == 0));
}

#[test]
fn test_parallel_and_sequential_agree() {
    let (input, parallel_out) = setup();
    let sequential_out = TempDir::new().unwrap();

    run_batch(&BatchOptions::new(input.path(), parallel_out.path()).with_workers(4)).unwrap();
    run_batch(&BatchOptions::new(input.path(), sequential_out.path()).sequential()).unwrap();

    for name in ["alpha.json", "beta.json"] {
        let a = fs::read_to_string(parallel_out.path().join(name)).unwrap();
        let b = fs::read_to_string(sequential_out.path().join(name)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_compact_output() {
    let (input, output) = setup();

    run_batch(&BatchOptions::new(input.path(), output.path()).compact()).unwrap();
    let json = fs::read_to_string(output.path().join("alpha.json")).unwrap();
    assert!(!json.contains('\n'));
    assert!(json.starts_with(r#"{"title":"Alpha Guide","outline":["#));
}

#[test]
fn test_progress_sees_every_document() {
    let (input, output) = setup();

    let mut seen = 0;
    let report = run_batch_with_progress(&BatchOptions::new(input.path(), output.path()), |_| {
        seen += 1;
    })
    .unwrap();
    assert_eq!(seen, report.total());
}

#[test]
fn test_empty_input_dir_is_success() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let nested = output.path().join("nested").join("out");

    let report = run_batch(&BatchOptions::new(input.path(), &nested)).unwrap();
    assert_eq!(report.total(), 0);
    assert!(nested.is_dir());
}

#[test]
fn test_missing_input_dir_fails() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("does-not-exist");

    let result = run_batch(&BatchOptions::new(&missing, root.path().join("out")));
    assert!(matches!(result, Err(Error::InputNotFound(_))));
}

#[test]
fn test_uncreatable_output_dir_fails() {
    let (input, output) = setup();
    let blocker = output.path().join("file");
    fs::write(&blocker, b"x").unwrap();

    let result = run_batch(&BatchOptions::new(input.path(), blocker.join("out")));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_degenerate_layout_uses_metadata_title() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut page = PageStream::letter(1);
    for i in 0..5 {
        page.push(frag("uniform text everywhere here", 12.0, 100.0 + i as f32 * 15.0));
    }
    write_layout(
        input.path(),
        "plain.layout",
        &LayoutDump::new(Some("Spec v2".to_string()), vec![page]),
    );

    run_batch(&BatchOptions::new(input.path(), output.path())).unwrap();
    let outline = read_outline(&output.path().join("plain.json"));
    assert_eq!(outline.title, "Spec v2");
    assert!(outline.is_empty());
}
