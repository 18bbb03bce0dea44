//! End-to-end outline tests over synthetic page streams.

use pdf_outline::render::{to_json, JsonFormat};
use pdf_outline::{
    analyze, build_outline, outline_from_pages, BBox, Fragment, HeadingLevel, Outline,
    OutlineOptions, PageStream,
};

const BODY: f32 = 11.0;

fn frag(text: &str, size: f32, x: f32, y: f32) -> Fragment {
    let width = text.chars().count() as f32 * size * 0.5;
    Fragment::new(text, size, 0, BBox::new(x, y, x + width, y + size))
}

fn body_block(page: &mut PageStream, top: f32, lines: usize) {
    for i in 0..lines {
        page.push(frag(
            "plain paragraph text that fills the page",
            BODY,
            72.0,
            top + i as f32 * 14.0,
        ));
    }
}

/// Three-page report: 28pt title, 20pt chapters, 16pt sections, 13pt
/// subsections, 11pt body.
fn report() -> Vec<PageStream> {
    let mut p1 = PageStream::letter(1);
    p1.push(frag("Annual Systems Report", 28.0, 72.0, 80.0));
    p1.push(frag("Overview", 20.0, 72.0, 150.0));
    body_block(&mut p1, 190.0, 8);
    p1.push(frag("Scope", 16.0, 72.0, 320.0));
    body_block(&mut p1, 350.0, 6);

    let mut p2 = PageStream::letter(2);
    p2.push(frag("Architecture", 20.0, 72.0, 90.0));
    body_block(&mut p2, 130.0, 6);
    p2.push(frag("Storage Layer", 16.0, 72.0, 240.0));
    p2.push(frag("Compaction", 13.0, 72.0, 280.0));
    body_block(&mut p2, 310.0, 6);

    let mut p3 = PageStream::letter(3);
    p3.push(frag("Results", 20.0, 72.0, 90.0));
    body_block(&mut p3, 130.0, 10);

    vec![p1, p2, p3]
}

fn texts(outline: &Outline) -> Vec<&str> {
    outline.entries.iter().map(|e| e.text.as_str()).collect()
}

#[test]
fn test_report_outline() {
    let outline = build_outline(report(), None, &OutlineOptions::default());

    assert_eq!(outline.title, "Annual Systems Report");
    assert_eq!(
        texts(&outline),
        vec![
            "Overview",
            "Scope",
            "Architecture",
            "Storage Layer",
            "Compaction",
            "Results"
        ]
    );
    assert_eq!(outline.count_level(HeadingLevel::H2), 3);
    assert_eq!(outline.count_level(HeadingLevel::H3), 2);
    assert_eq!(outline.count_level(HeadingLevel::H4), 1);
}

#[test]
fn test_output_is_deterministic() {
    let options = OutlineOptions::default();
    let first = to_json(&build_outline(report(), None, &options), JsonFormat::Pretty).unwrap();

    for _ in 0..5 {
        let again = to_json(&build_outline(report(), None, &options), JsonFormat::Pretty).unwrap();
        assert_eq!(first, again);
    }

    // Page streams arriving out of order (e.g. from parallel extraction)
    let mut shuffled = report();
    shuffled.reverse();
    let reordered = to_json(&build_outline(shuffled, None, &options), JsonFormat::Pretty).unwrap();
    assert_eq!(first, reordered);
}

#[test]
fn test_levels_are_monotonic_in_size() {
    let sizes = [30.0, 24.0, 20.0, 17.0, 14.0, 12.5];
    let mut page = PageStream::letter(2);
    for (i, size) in sizes.iter().enumerate() {
        page.push(frag(&format!("Heading {}", i), *size, 72.0, 80.0 + i as f32 * 100.0));
        body_block(&mut page, 110.0 + i as f32 * 100.0, 3);
    }
    let mut first = PageStream::letter(1);
    body_block(&mut first, 100.0, 10);

    let analysis = analyze(vec![first, page], None, &OutlineOptions::default());
    let entries = &analysis.outline.entries;
    assert_eq!(entries.len(), sizes.len());

    for pair in entries.windows(2) {
        // Entries are in size order, so depth never decreases
        assert!(pair[0].level <= pair[1].level);
    }
    assert_eq!(entries[0].level, HeadingLevel::H1);
    assert_eq!(entries.last().unwrap().level, HeadingLevel::H4);
}

#[test]
fn test_body_text_never_becomes_heading() {
    let mut page = PageStream::letter(1);
    page.push(frag("Design Notes", 18.0, 72.0, 80.0));
    body_block(&mut page, 120.0, 10);
    // Short body-size and smaller fragments
    page.push(frag("Note", BODY, 72.0, 300.0));
    page.push(frag("fine print", 8.0, 72.0, 320.0));

    let analysis = analyze(vec![page], None, &OutlineOptions::default());
    let body = analysis.stats.body_size.unwrap();
    assert!((body - BODY).abs() < 0.01);

    let outline = &analysis.outline;
    assert!(outline.entries.iter().all(|e| e.level.is_heading()));
    assert!(!texts(outline).contains(&"Note"));
    assert!(!texts(outline).contains(&"fine print"));
}

#[test]
fn test_title_never_repeats_as_entry() {
    let mut pages = report();
    // Same text again on page 3 at a chapter size
    pages[2].push(frag("ANNUAL  systems report", 20.0, 72.0, 400.0));

    let outline = build_outline(pages, None, &OutlineOptions::default());
    assert_eq!(outline.title, "Annual Systems Report");
    assert!(outline
        .entries
        .iter()
        .all(|e| !e.text.eq_ignore_ascii_case("annual systems report")
            && !e.text.to_lowercase().contains("annual")));
}

#[test]
fn test_running_footer_is_suppressed() {
    let mut pages = Vec::new();
    for number in 1..=5 {
        let mut page = PageStream::letter(number);
        page.push(frag(&format!("Chapter {}", number), 20.0, 72.0, 100.0));
        body_block(&mut page, 140.0, 8);
        page.push(frag("Confidential Draft", 14.0, 240.0, 750.0));
        pages.push(page);
    }

    let analysis = analyze(pages, None, &OutlineOptions::default());
    let outline = &analysis.outline;

    assert!(outline
        .entries
        .iter()
        .all(|e| !e.text.contains("Confidential Draft")));
    assert!(!outline.title.contains("Confidential Draft"));
    assert!(analysis.stats.vetoed >= 5);
    assert_eq!(outline.title, "Chapter 1");
    assert_eq!(texts(outline), vec!["Chapter 2", "Chapter 3", "Chapter 4", "Chapter 5"]);
}

#[test]
fn test_running_header_on_few_pages_is_kept() {
    // A margin heading on 2 of 6 pages is not running text
    let mut pages = Vec::new();
    for number in 1..=6 {
        let mut page = PageStream::letter(number);
        body_block(&mut page, 140.0, 8);
        if number == 2 || number == 4 {
            page.push(frag("Appendix Notes", 16.0, 72.0, 40.0));
        }
        pages.push(page);
    }

    let outline = build_outline(pages, None, &OutlineOptions::default());
    assert_eq!(texts(&outline), vec!["Appendix Notes", "Appendix Notes"]);
}

#[test]
fn test_numbered_chapters_in_header_band_are_kept() {
    // Distinct chapter titles in the top margin are not running text
    let mut pages = Vec::new();
    for number in 1..=4 {
        let mut page = PageStream::letter(number);
        page.push(frag(&format!("Chapter {}", number), 20.0, 72.0, 40.0));
        if number == 1 {
            page.push(frag("Handbook", 28.0, 72.0, 90.0));
        }
        body_block(&mut page, 140.0, 8);
        pages.push(page);
    }

    let outline = build_outline(pages, None, &OutlineOptions::default());
    assert_eq!(outline.title, "Handbook");
    assert_eq!(
        texts(&outline),
        vec!["Chapter 1", "Chapter 2", "Chapter 3", "Chapter 4"]
    );
    assert!(outline.entries.iter().all(|e| e.level == HeadingLevel::H2));
}

#[test]
fn test_wrapped_heading_merges_into_one_entry() {
    let mut p1 = PageStream::letter(1);
    p1.push(frag("Course Handbook", 28.0, 72.0, 80.0));
    body_block(&mut p1, 150.0, 6);
    p1.push(frag("Introduction to", 16.0, 72.0, 300.0));
    p1.push(frag("Distributed Systems", 16.0, 72.0, 320.0));
    body_block(&mut p1, 350.0, 6);

    let outline = build_outline(vec![p1], None, &OutlineOptions::default());

    let h2: Vec<_> = outline
        .entries
        .iter()
        .filter(|e| e.level == HeadingLevel::H2)
        .collect();
    assert_eq!(h2.len(), 1);
    assert_eq!(h2[0].text, "Introduction to Distributed Systems");
    assert_eq!(h2[0].page, 1);
}

#[test]
fn test_body_between_lines_prevents_merge() {
    let mut p1 = PageStream::letter(1);
    p1.push(frag("Course Handbook", 28.0, 72.0, 80.0));
    p1.push(frag("Introduction to", 16.0, 72.0, 300.0));
    p1.push(frag("plain paragraph text in between", BODY, 72.0, 318.0));
    p1.push(frag("Distributed Systems", 16.0, 72.0, 332.0));
    let mut p2 = PageStream::letter(2);
    body_block(&mut p2, 100.0, 10);

    let analysis = analyze(vec![p1, p2], None, &OutlineOptions::default());
    assert_eq!(analysis.stats.block_count, 3);
    assert_eq!(
        texts(&analysis.outline),
        vec!["Introduction to", "Distributed Systems"]
    );
}

#[test]
fn test_empty_document() {
    let empty = build_outline(Vec::new(), None, &OutlineOptions::default());
    assert_eq!(
        to_json(&empty, JsonFormat::Compact).unwrap(),
        r#"{"title":"","outline":[]}"#
    );

    // Pages without any text behave the same
    let blank = outline_from_pages(vec![PageStream::letter(1), PageStream::letter(2)], None);
    assert_eq!(blank, empty);
}

#[test]
fn test_metadata_title_fallback() {
    let mut page = PageStream::letter(1);
    body_block(&mut page, 100.0, 12);

    let with_meta = outline_from_pages(vec![page.clone()], Some("Spec v2"));
    assert_eq!(with_meta.title, "Spec v2");
    assert!(with_meta.is_empty());

    let without = outline_from_pages(vec![page.clone()], None);
    assert_eq!(without.title, "");

    let blank_meta = outline_from_pages(vec![page], Some("   "));
    assert_eq!(blank_meta.title, "");
}

#[test]
fn test_page_title_wins_over_metadata() {
    let outline = build_outline(report(), Some("report-final.docx"), &OutlineOptions::default());
    assert_eq!(outline.title, "Annual Systems Report");
}

#[test]
fn test_tree_nests_by_level() {
    let outline = build_outline(report(), None, &OutlineOptions::default());
    let tree = outline.to_tree();

    let names: Vec<&str> = tree.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(names, vec!["Overview", "Architecture", "Results"]);
    assert_eq!(tree[1].children.len(), 1);
    assert_eq!(tree[1].children[0].text, "Storage Layer");
    assert_eq!(tree[1].children[0].children[0].text, "Compaction");
}

#[test]
fn test_boilerplate_filter_can_be_disabled() {
    let mut p1 = PageStream::letter(1);
    p1.push(frag("Release Guide", 24.0, 72.0, 80.0));
    p1.push(frag("www.example.com", 16.0, 72.0, 300.0));
    body_block(&mut p1, 150.0, 8);

    let filtered = build_outline(vec![p1.clone()], None, &OutlineOptions::default());
    assert!(filtered.is_empty());

    let options = OutlineOptions::default().with_boilerplate_filter(false);
    let kept = build_outline(vec![p1], None, &options);
    assert_eq!(texts(&kept), vec!["www.example.com"]);
}
