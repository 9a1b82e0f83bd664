//! Integration tests for report rendering.

use pdfdiff::diff::DiffReport;
use pdfdiff::error::{Error, Side};
use pdfdiff::render::{Font, OutputDocument, RenderOptions, ReportRenderer, Rgb};
use pdfdiff::resolve::{VersionInfo, VersionRef};

const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

fn one_page_pdf(text: &str) -> Vec<u8> {
    let mut doc = OutputDocument::new(612.0, 792.0);
    let page = doc.add_page();
    doc.draw_text(page, 72.0, 720.0, text, Font::Helvetica, 12.0, BLACK)
        .unwrap();
    doc.save().unwrap()
}

fn version(id: &str, number: Option<u32>) -> VersionRef {
    VersionRef {
        id: id.to_string(),
        binary_id: "0".repeat(24),
        info: number.map(|n| VersionInfo::new(n, chrono::Utc::now())),
    }
}

fn all_text(bytes: &[u8]) -> String {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages).unwrap()
}

#[test]
fn test_render_produces_openable_pdf() {
    let diff = DiffReport::compute("steady text here", "steady text here");
    let right_bytes = one_page_pdf("steady text here");

    let bytes = ReportRenderer::new(RenderOptions::default())
        .render(&diff, &version("a", Some(1)), &version("b", Some(2)), &right_bytes)
        .unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}

#[test]
fn test_text_view_shows_modified_pair() {
    let diff = DiffReport::compute("fee is ten dollars", "fee is twenty dollars");
    let right_bytes = one_page_pdf("fee is twenty dollars");

    let bytes = ReportRenderer::new(RenderOptions::default())
        .render(&diff, &version("a", Some(1)), &version("b", Some(2)), &right_bytes)
        .unwrap();
    let text = all_text(&bytes);

    assert!(text.contains("changed from"));
    assert!(text.contains("ten"));
    assert!(text.contains("changed to"));
    assert!(text.contains("twenty"));
    assert!(text.contains("Modified segments: 1"));
}

#[test]
fn test_divider_page_precedes_copied_pages() {
    let diff = DiffReport::compute("same", "same");
    let right_bytes = one_page_pdf("same");

    let bytes = ReportRenderer::new(RenderOptions::default())
        .render(&diff, &version("a", None), &version("b", None), &right_bytes)
        .unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let divider = doc.extract_text(&[3]).unwrap();
    assert!(divider.contains("Original pages of the newer version"));

    let copied = doc.extract_text(&[4]).unwrap();
    assert!(copied.contains("Combined Document"));
    assert!(copied.contains("page 1 of 1"));
}

#[test]
fn test_unreadable_source_degrades_to_error_page() {
    let diff = DiffReport::compute("left words", "right words");

    let bytes = ReportRenderer::new(RenderOptions::default())
        .render(&diff, &version("a", None), &version("b", None), b"not a pdf")
        .unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    // Cover, text view, divider, substituted error page.
    assert_eq!(doc.get_pages().len(), 4);
    assert!(all_text(&bytes).contains("Original pages unavailable"));
}

#[test]
fn test_empty_documents_render_placeholder_note() {
    let diff = DiffReport::compute("", "");
    let right_bytes = one_page_pdf(" ");

    let bytes = ReportRenderer::new(RenderOptions::default())
        .render(&diff, &version("a", None), &version("b", None), &right_bytes)
        .unwrap();

    assert!(all_text(&bytes).contains("No text content was extracted"));
}

#[test]
fn test_custom_title_appears_on_cover() {
    let diff = DiffReport::compute("x", "x");
    let right_bytes = one_page_pdf("x");
    let options = RenderOptions::default().with_title("Quarterly Policy Redline");

    let bytes = ReportRenderer::new(options)
        .render(&diff, &version("a", None), &version("b", None), &right_bytes)
        .unwrap();

    assert!(all_text(&bytes).contains("Quarterly Policy Redline"));
}

#[test]
fn test_render_failure_page_is_self_describing() {
    let error = Error::Extraction {
        side: Side::Right,
        reason: "PDF parsing error: invalid cross-reference table".into(),
    };
    let bytes = ReportRenderer::render_failure(&RenderOptions::default(), &error).unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    let text = all_text(&bytes);
    assert!(text.contains("Comparison unavailable"));
    assert!(text.contains("extraction_error"));
    assert!(text.contains("right version"));
    assert!(text.contains("Both document versions remain stored"));
}

#[test]
fn test_render_failure_wraps_long_reasons() {
    let reason = "token ".repeat(60);
    let error = Error::Render(reason);
    let bytes = ReportRenderer::render_failure(&RenderOptions::default(), &error).unwrap();

    let text = all_text(&bytes);
    assert!(text.contains("render_error"));
    assert!(text.contains("token"));
}

#[test]
fn test_render_failure_truncates_oversized_reasons() {
    // Far more detail lines than the single page can hold.
    let reason: String = (0..900).map(|i| format!("w{:04} ", i)).collect();
    let error = Error::Render(reason);
    let bytes = ReportRenderer::render_failure(&RenderOptions::default(), &error).unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    let text = all_text(&bytes);
    assert!(text.contains("w0000"));
    assert!(text.contains("..."));
    assert!(!text.contains("w0899"), "overflowing chunks must be dropped");
    assert!(text.contains("Both document versions remain stored"));
}

#[test]
fn test_copied_pages_keep_their_own_size() {
    // A5 landscape source; the report's own pages are US Letter.
    let mut source = OutputDocument::new(595.0, 420.0);
    let page = source.add_page();
    source
        .draw_text(page, 40.0, 380.0, "compact page", Font::Helvetica, 10.0, BLACK)
        .unwrap();
    let right_bytes = source.save().unwrap();

    let diff = DiffReport::compute("compact page", "compact page");
    let bytes = ReportRenderer::new(RenderOptions::default())
        .render(&diff, &version("a", None), &version("b", None), &right_bytes)
        .unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages();
    let copied_id = pages[&4];
    let copied = doc.get_object(copied_id).unwrap().as_dict().unwrap();
    let media_box = copied.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(media_box[2].as_float().unwrap(), 595.0);
    assert_eq!(media_box[3].as_float().unwrap(), 420.0);
}
