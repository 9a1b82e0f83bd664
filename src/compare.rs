//! High-level comparison pipeline: resolve, extract, diff, render.
//!
//! [`DocumentComparer::compare`] is total. Any failure inside the pipeline is
//! rendered as a one-page fallback document instead of an error, so callers
//! always receive a displayable PDF.
//!
//! # Example
//!
//! ```no_run
//! use pdfdiff::{DocumentComparer, MemoryDocumentStore};
//! use std::sync::Arc;
//!
//! let mut store = MemoryDocumentStore::new();
//! let old_id = store.add_document(std::fs::read("v1.pdf").unwrap());
//! let new_id = store.add_document(std::fs::read("v2.pdf").unwrap());
//!
//! let store = Arc::new(store);
//! let comparer = DocumentComparer::new(store.clone(), store);
//! let report = comparer.compare(&old_id, &new_id);
//! std::fs::write("comparison.pdf", report).unwrap();
//! ```

use crate::diff::DiffReport;
use crate::error::{Result, Side};
use crate::extract::{PdfTextExtractor, TextExtractor};
use crate::render::{emergency_pdf, RenderOptions, ReportRenderer};
use crate::resolve::{BinaryStore, ContentResolver, MetadataStore};
use std::sync::Arc;

/// Compares two stored document versions and renders the result as a PDF.
pub struct DocumentComparer {
    resolver: ContentResolver,
    extractor: Arc<dyn TextExtractor>,
    options: RenderOptions,
}

impl DocumentComparer {
    /// Create a comparer over the given stores with default options.
    pub fn new(metadata: Arc<dyn MetadataStore>, binaries: Arc<dyn BinaryStore>) -> Self {
        Self {
            resolver: ContentResolver::new(metadata, binaries),
            extractor: Arc::new(PdfTextExtractor::new()),
            options: RenderOptions::default(),
        }
    }

    /// Set rendering options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Compare two document references and render the comparison PDF.
    ///
    /// Never fails: pipeline errors are rendered onto a fallback page, and if
    /// even that page cannot be produced a minimal static document is
    /// returned. The returned buffer is always a non-empty, openable PDF.
    pub fn compare(&self, left_ref: &str, right_ref: &str) -> Vec<u8> {
        self.compare_with(left_ref, right_ref, self.options.clone())
    }

    /// Like [`compare`](Self::compare), with highlighting toggled per call.
    ///
    /// When disabled, the text view keeps its block structure and labels but
    /// draws no background tints, and copied pages carry no change markers.
    pub fn compare_with_highlights(
        &self,
        left_ref: &str,
        right_ref: &str,
        show_highlights: bool,
    ) -> Vec<u8> {
        let options = self.options.clone().with_highlights(show_highlights);
        self.compare_with(left_ref, right_ref, options)
    }

    fn compare_with(&self, left_ref: &str, right_ref: &str, options: RenderOptions) -> Vec<u8> {
        match self.run(left_ref, right_ref, &options) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!(
                    "Comparison of {:?} and {:?} failed: {}",
                    left_ref,
                    right_ref,
                    err
                );
                match ReportRenderer::render_failure(&options, &err) {
                    Ok(bytes) => bytes,
                    Err(render_err) => {
                        log::warn!("Fallback page rendering failed: {}", render_err);
                        emergency_pdf()
                    }
                }
            }
        }
    }

    fn run(&self, left_ref: &str, right_ref: &str, options: &RenderOptions) -> Result<Vec<u8>> {
        let (left, right) = self.resolver.fetch_pair(left_ref, right_ref)?;
        log::debug!(
            "Resolved {} and {} ({} and {} bytes)",
            left.version.version_label(),
            right.version.version_label(),
            left.bytes.len(),
            right.bytes.len()
        );

        let left_text = self
            .extractor
            .extract(&left.bytes)
            .map_err(|err| err.for_side(Side::Left))?;
        let right_text = self
            .extractor
            .extract(&right.bytes)
            .map_err(|err| err.for_side(Side::Right))?;

        let diff = DiffReport::compute(&left_text, &right_text);
        log::debug!(
            "Diff produced {} spans ({} changes)",
            diff.spans.len(),
            diff.counts.total_changes()
        );

        let renderer = ReportRenderer::new(options.clone());
        renderer.render(&diff, &left.version, &right.version, &right.bytes)
    }
}
