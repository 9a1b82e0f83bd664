//! # pdfdiff
//!
//! Renders a visual comparison document from two versions of a PDF.
//!
//! Given two stored document versions, this library extracts their text,
//! computes a word-level diff, and renders a combined report PDF: a cover
//! page with change counts, a highlighted combined text view, and the newer
//! version's original pages stamped with a header bar and approximate change
//! markers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdiff::{DocumentComparer, MemoryDocumentStore};
//! use std::sync::Arc;
//!
//! fn main() -> pdfdiff::Result<()> {
//!     // Store the two versions to compare
//!     let mut store = MemoryDocumentStore::new();
//!     let old_id = store.add_document(std::fs::read("contract_v1.pdf")?);
//!     let new_id = store.add_document(std::fs::read("contract_v2.pdf")?);
//!
//!     // Render the comparison report
//!     let store = Arc::new(store);
//!     let comparer = DocumentComparer::new(store.clone(), store);
//!     let report = comparer.compare(&old_id, &new_id);
//!
//!     std::fs::write("comparison.pdf", report)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Word-level diffing**: Myers diff over words, with adjacent removed and
//!   added runs fused into modified pairs
//! - **Total comparison**: `compare` never fails; pipeline errors render as a
//!   one-page fallback document
//! - **Faithful page copies**: the newer version's pages are embedded
//!   verbatim, not re-rendered
//! - **Pluggable storage**: bring your own metadata and binary stores
//! - **Concurrent fetch**: both versions' content is fetched in parallel
//! - **Structured diff model**: serializable spans and counts for non-PDF
//!   consumers

pub mod compare;
pub mod diff;
pub mod error;
pub mod extract;
pub mod render;
pub mod resolve;

// Re-export commonly used types
pub use compare::DocumentComparer;
pub use diff::{ChangeCounts, DiffReport, DiffSpan};
pub use error::{Error, Result, Side};
pub use extract::{is_pdf, sniff_pdf, PdfFormat, PdfTextExtractor, TextExtractor};
pub use render::{ChangeMarker, MarkerKind, Palette, RenderOptions, Rgb};
pub use resolve::{
    BinaryStore, ContentResolver, MemoryDocumentStore, MetadataStore, ResolvedDocument,
    VersionInfo, VersionRef,
};

use crate::render::ReportRenderer;
use std::sync::Arc;

/// Compare two stored document versions in one call.
///
/// Convenience wrapper around [`DocumentComparer`] with default options.
/// Never fails; see [`DocumentComparer::compare`].
///
/// # Example
///
/// ```no_run
/// use pdfdiff::{compare_documents, MemoryDocumentStore};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryDocumentStore::new());
/// let report = compare_documents(store.clone(), store, "doc-v1", "doc-v2");
/// std::fs::write("comparison.pdf", report).unwrap();
/// ```
pub fn compare_documents(
    metadata: Arc<dyn MetadataStore>,
    binaries: Arc<dyn BinaryStore>,
    left_ref: &str,
    right_ref: &str,
) -> Vec<u8> {
    DocumentComparer::new(metadata, binaries).compare(left_ref, right_ref)
}

/// Compare two PDFs already held in memory.
///
/// Skips content resolution and renders with default options. Unlike
/// [`DocumentComparer::compare`] this reports pipeline errors to the caller
/// instead of rendering a fallback page.
pub fn compare_bytes(left: &[u8], right: &[u8]) -> Result<Vec<u8>> {
    let extractor = PdfTextExtractor::new();
    let left_text = extractor
        .extract(left)
        .map_err(|err| err.for_side(Side::Left))?;
    let right_text = extractor
        .extract(right)
        .map_err(|err| err.for_side(Side::Right))?;

    let diff = DiffReport::compute(&left_text, &right_text);

    let left_ref = VersionRef {
        id: "original".to_string(),
        binary_id: String::new(),
        info: None,
    };
    let right_ref = VersionRef {
        id: "revised".to_string(),
        binary_id: String::new(),
        info: None,
    };
    ReportRenderer::new(RenderOptions::default()).render(&diff, &left_ref, &right_ref, right)
}

/// Diff two plain-text strings into a span sequence with change counts.
///
/// # Example
///
/// ```
/// use pdfdiff::diff_texts;
///
/// let report = diff_texts("the quick fox", "the slow fox");
/// assert_eq!(report.counts.modified, 1);
/// ```
pub fn diff_texts(left: &str, right: &str) -> DiffReport {
    DiffReport::compute(left, right)
}
