//! Assembly of the comparison report: cover page, combined text view,
//! divider, and the stamped overlay section.

use crate::diff::{DiffReport, DiffSpan};
use crate::error::{Error, Result};
use crate::render::fonts::Font;
use crate::render::layout::{wrap_line, RenderCursor};
use crate::render::options::{Palette, RenderOptions, Rgb};
use crate::render::output::OutputDocument;
use crate::resolve::VersionRef;
use chrono::Utc;
use serde::{Deserialize, Serialize};

const INK: Rgb = Rgb::new(0.0, 0.0, 0.0);
const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

const TITLE_SIZE: f32 = 22.0;
const HEADING_SIZE: f32 = 12.0;
const LABEL_SIZE: f32 = 7.5;
const HEADER_BAR_HEIGHT: f32 = 18.0;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Kind of change a marker points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Content only in the newer version.
    Added,
    /// Content only in the older version.
    Removed,
    /// Content replaced between versions.
    Modified,
}

impl MarkerKind {
    /// Marker kind for a span; `None` for unchanged spans.
    pub fn from_span(span: &DiffSpan) -> Option<Self> {
        match span {
            DiffSpan::Added { .. } => Some(MarkerKind::Added),
            DiffSpan::Removed { .. } => Some(MarkerKind::Removed),
            DiffSpan::Modified { .. } => Some(MarkerKind::Modified),
            DiffSpan::Unchanged { .. } => None,
        }
    }

    /// One-character prefix drawn next to the marker.
    pub fn sigil(&self) -> &'static str {
        match self {
            MarkerKind::Added => "+",
            MarkerKind::Removed => "-",
            MarkerKind::Modified => "~",
        }
    }

    /// Lowercase kind name for legends.
    pub fn label(&self) -> &'static str {
        match self {
            MarkerKind::Added => "added",
            MarkerKind::Removed => "removed",
            MarkerKind::Modified => "modified",
        }
    }
}

/// Approximate change annotation placed on an overlay page.
///
/// Positions are derived from a running character offset over the span
/// sequence, not from real page coordinates. This is a sampling heuristic,
/// not an exact mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMarker {
    /// Zero-based index among the copied pages.
    pub page_index: usize,

    /// Vertical position as a 0..1 fraction from the page top.
    pub y: f32,

    /// Kind of change.
    pub kind: MarkerKind,

    /// Short excerpt of the changed text.
    pub label: String,
}

/// Sample approximate markers from the fused span sequence.
///
/// Walks the spans accumulating a running character offset over the new-side
/// text and estimates a page by assuming characters spread evenly over the
/// copied pages. Only the first `annotated_pages` pages receive markers, at
/// most `markers_per_page` each; changes estimated to land further in are
/// dropped.
pub fn sample_markers(
    spans: &[DiffSpan],
    page_count: usize,
    options: &RenderOptions,
) -> Vec<ChangeMarker> {
    let annotated = options.annotated_pages.min(page_count);
    if annotated == 0 || options.markers_per_page == 0 {
        return Vec::new();
    }

    let total: usize = spans
        .iter()
        .map(|span| span.new_text().map_or(0, str::len))
        .sum();
    if total == 0 {
        return Vec::new();
    }
    let chars_per_page = (total as f32 / page_count as f32).max(1.0);

    let mut markers = Vec::new();
    let mut per_page = vec![0usize; annotated];
    let mut offset = 0usize;

    for span in spans {
        if let Some(kind) = MarkerKind::from_span(span) {
            let estimate = offset as f32 / chars_per_page;
            // Changes at the very end of the text estimate to page_count;
            // clamp them onto the last page instead of dropping them.
            let page = (estimate as usize).min(page_count - 1);
            if page < annotated && per_page[page] < options.markers_per_page {
                markers.push(ChangeMarker {
                    page_index: page,
                    y: (estimate - page as f32).min(1.0),
                    kind,
                    label: marker_label(kind, span),
                });
                per_page[page] += 1;
            }
        }
        offset += span.new_text().map_or(0, str::len);
    }

    markers
}

fn marker_label(kind: MarkerKind, span: &DiffSpan) -> String {
    let text = span.new_text().or_else(|| span.old_text()).unwrap_or_default();
    format!("{} {}", kind.sigil(), excerpt(text, 32))
}

/// Single-line excerpt of at most `max_chars` characters.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

fn marker_accent(palette: &Palette, kind: MarkerKind) -> Rgb {
    match kind {
        MarkerKind::Added => palette.added_accent,
        MarkerKind::Removed => palette.removed_accent,
        MarkerKind::Modified => palette.modified_accent,
    }
}

/// Renders a [`DiffReport`] into the output PDF.
pub struct ReportRenderer {
    options: RenderOptions,
    doc: OutputDocument,
    cursor: RenderCursor,
}

impl ReportRenderer {
    /// Create a renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        let doc = OutputDocument::new(options.page_width, options.page_height);
        let cursor = RenderCursor::at_page(0, options.page_width, options.page_height, options.margin);
        Self {
            options,
            doc,
            cursor,
        }
    }

    /// Render the full report and serialize it.
    ///
    /// Page order: cover, combined text view (paginated), divider, then the
    /// newer document's pages stamped with a header bar and sampled markers.
    pub fn render(
        mut self,
        diff: &DiffReport,
        left: &VersionRef,
        right: &VersionRef,
        right_bytes: &[u8],
    ) -> Result<Vec<u8>> {
        self.cover_page(diff, left, right)?;
        self.text_view(diff)?;
        self.divider_page()?;
        self.overlay_section(diff, right, right_bytes)?;
        self.doc.save()
    }

    /// Render the one-page fallback document for a failed comparison.
    pub fn render_failure(options: &RenderOptions, error: &Error) -> Result<Vec<u8>> {
        let mut doc = OutputDocument::new(options.page_width, options.page_height);
        let page = doc.add_page();
        let margin = options.margin;
        let mut y = options.top_y();

        doc.draw_text(
            page,
            margin,
            y,
            "Comparison unavailable",
            Font::HelveticaBold,
            18.0,
            INK,
        )?;
        y -= 30.0;

        doc.draw_text(
            page,
            margin,
            y,
            "The document comparison could not be generated.",
            Font::Helvetica,
            options.body_size,
            INK,
        )?;
        y -= options.line_height * 2.0;

        doc.draw_text(
            page,
            margin,
            y,
            &format!("Failure kind: {}", error.kind()),
            Font::HelveticaBold,
            options.body_size,
            INK,
        )?;
        y -= options.line_height;

        // Everything must fit on this one page: chunks past the floor are
        // replaced by an ellipsis, and the closing note is pinned above the
        // bottom margin.
        let floor = margin + options.line_height * 2.0;
        let detail = format!("Details: {}", error);
        for chunk in wrap_line(&detail, options.wrap_budget) {
            if y < floor {
                doc.draw_text(page, margin, y, "...", Font::Helvetica, options.body_size, INK)?;
                break;
            }
            doc.draw_text(page, margin, y, chunk, Font::Helvetica, options.body_size, INK)?;
            y -= options.line_height;
        }

        doc.draw_text(
            page,
            margin,
            margin,
            "Both document versions remain stored and unmodified.",
            Font::HelveticaOblique,
            8.5,
            options.palette.muted,
        )?;

        doc.save()
    }

    fn cover_page(
        &mut self,
        diff: &DiffReport,
        left: &VersionRef,
        right: &VersionRef,
    ) -> Result<()> {
        let page = self.doc.add_page();
        let margin = self.options.margin;
        let mut y = self.options.top_y();

        self.doc.draw_text(
            page,
            margin,
            y,
            &self.options.title,
            Font::HelveticaBold,
            TITLE_SIZE,
            INK,
        )?;
        y -= 18.0;

        self.doc.draw_text(
            page,
            margin,
            y,
            &format!("Generated {}", Utc::now().format(TIMESTAMP_FORMAT)),
            Font::HelveticaOblique,
            8.5,
            self.options.palette.muted,
        )?;
        y -= 34.0;

        // The version block is shown only when both references resolved to
        // stored metadata.
        if let (Some(left_info), Some(right_info)) = (&left.info, &right.info) {
            self.doc.draw_text(
                page,
                margin,
                y,
                "Compared versions",
                Font::HelveticaBold,
                HEADING_SIZE,
                self.options.palette.header,
            )?;
            y -= 18.0;

            self.doc.draw_text(
                page,
                margin,
                y,
                &format!(
                    "Older: {} (uploaded {})",
                    left.version_label(),
                    left_info.uploaded_at.format(TIMESTAMP_FORMAT)
                ),
                Font::Helvetica,
                self.options.body_size,
                INK,
            )?;
            y -= self.options.line_height;

            self.doc.draw_text(
                page,
                margin,
                y,
                &format!(
                    "Newer: {} (uploaded {})",
                    right.version_label(),
                    right_info.uploaded_at.format(TIMESTAMP_FORMAT)
                ),
                Font::Helvetica,
                self.options.body_size,
                INK,
            )?;
            y -= 30.0;
        }

        self.doc.draw_text(
            page,
            margin,
            y,
            "Summary of changes",
            Font::HelveticaBold,
            HEADING_SIZE,
            self.options.palette.header,
        )?;
        y -= 20.0;

        let rows = [
            ("Added segments", diff.counts.added, self.options.palette.added_bg),
            ("Removed segments", diff.counts.removed, self.options.palette.removed_bg),
            ("Modified segments", diff.counts.modified, self.options.palette.modified_new_bg),
        ];
        for (label, count, swatch) in rows {
            if self.options.show_highlights {
                self.doc.draw_rect(page, margin, y - 2.0, 14.0, 10.0, swatch)?;
            }
            self.doc.draw_text(
                page,
                margin + 22.0,
                y,
                &format!("{}: {}", label, count),
                Font::Helvetica,
                self.options.body_size,
                INK,
            )?;
            y -= 18.0;
        }
        y -= 14.0;

        let legend: &[&str] = if self.options.show_highlights {
            &[
                "In the combined text that follows, added text is tinted green and",
                "removed text is tinted red. Modified passages appear as paired blocks",
                "showing the text before and after the change.",
            ]
        } else {
            &[
                "Highlighting is disabled for this report. Modified passages still",
                "appear as paired blocks showing the text before and after the change.",
            ]
        };
        for line in legend {
            self.doc.draw_text(
                page,
                margin,
                y,
                line,
                Font::Helvetica,
                8.5,
                self.options.palette.muted,
            )?;
            y -= 12.0;
        }

        Ok(())
    }

    fn text_view(&mut self, diff: &DiffReport) -> Result<()> {
        self.start_text_page(false)?;

        if diff.spans.is_empty() {
            let page = self.cursor.page;
            self.doc.draw_text(
                page,
                self.options.margin,
                self.cursor.y,
                "No text content was extracted from either version.",
                Font::HelveticaOblique,
                self.options.body_size,
                self.options.palette.muted,
            )?;
            return Ok(());
        }

        for span in &diff.spans {
            match span {
                DiffSpan::Unchanged { text } => {
                    self.text_block(text, Font::Helvetica, INK, None, false)?;
                }
                DiffSpan::Added { text } => {
                    let tint = self.tint(self.options.palette.added_bg);
                    self.text_block(text, Font::Helvetica, INK, tint, false)?;
                }
                DiffSpan::Removed { text } => {
                    let tint = self.tint(self.options.palette.removed_bg);
                    self.text_block(
                        text,
                        Font::HelveticaOblique,
                        self.options.palette.muted,
                        tint,
                        false,
                    )?;
                }
                DiffSpan::Modified { old, new } => {
                    self.sub_label("changed from")?;
                    let tint = self.tint(self.options.palette.modified_old_bg);
                    self.text_block(
                        old,
                        Font::HelveticaOblique,
                        self.options.palette.muted,
                        tint,
                        true,
                    )?;

                    self.sub_label("changed to")?;
                    let tint = self.tint(self.options.palette.modified_new_bg);
                    self.text_block(new, Font::HelveticaBold, INK, tint, false)?;
                }
            }
        }

        Ok(())
    }

    fn tint(&self, color: Rgb) -> Option<Rgb> {
        if self.options.show_highlights {
            Some(color)
        } else {
            None
        }
    }

    /// Start a new combined-text page and position the cursor under its
    /// heading. Continuation pages carry a "(continued)" heading.
    fn start_text_page(&mut self, continued: bool) -> Result<()> {
        let page = self.doc.add_page();
        self.cursor = RenderCursor::at_page(
            page,
            self.options.page_width,
            self.options.page_height,
            self.options.margin,
        );

        let heading = if continued {
            "Combined text (continued)"
        } else {
            "Combined text"
        };
        self.doc.draw_text(
            page,
            self.options.margin,
            self.cursor.y,
            heading,
            Font::HelveticaBold,
            HEADING_SIZE,
            self.options.palette.header,
        )?;
        let rule_y = self.cursor.y - 6.0;
        self.doc.draw_line(
            page,
            self.options.margin,
            rule_y,
            self.options.page_width - self.options.margin,
            rule_y,
            0.8,
            self.options.palette.header,
        )?;
        self.cursor.advance(30.0);
        Ok(())
    }

    /// Small oblique label above a modified sub-block.
    fn sub_label(&mut self, label: &str) -> Result<()> {
        if self.cursor.needs_page_break(self.options.line_height) {
            self.start_text_page(true)?;
        }
        self.doc.draw_text(
            self.cursor.page,
            self.options.margin,
            self.cursor.y,
            label,
            Font::HelveticaOblique,
            LABEL_SIZE,
            self.options.palette.muted,
        )?;
        self.cursor.advance(self.options.line_height * 0.75);
        Ok(())
    }

    /// Draw one span's text as a wrapped block, breaking pages as needed.
    fn text_block(
        &mut self,
        text: &str,
        font: Font,
        color: Rgb,
        tint: Option<Rgb>,
        strike: bool,
    ) -> Result<()> {
        let margin = self.options.margin;
        let size = self.options.body_size;
        let line_height = self.options.line_height;
        let blank_gap = line_height * 0.5;
        let budget = self.options.wrap_budget;

        for line in text.split('\n') {
            if line.trim().is_empty() {
                // Blank lines consume a fixed gap and draw nothing.
                if self.cursor.needs_page_break(blank_gap) {
                    self.start_text_page(true)?;
                } else {
                    self.cursor.advance(blank_gap);
                }
                continue;
            }

            for chunk in wrap_line(line, budget) {
                if chunk.is_empty() {
                    continue;
                }
                if self.cursor.needs_page_break(line_height) {
                    self.start_text_page(true)?;
                }

                let y = self.cursor.y;
                let page = self.cursor.page;
                let width = self.doc.measure_text(chunk, font, size);
                if let Some(bg) = tint {
                    self.doc
                        .draw_rect(page, margin - 1.5, y - 3.0, width + 3.0, line_height - 2.0, bg)?;
                }
                self.doc.draw_text(page, margin, y, chunk, font, size, color)?;
                if strike {
                    let mid = y + size * 0.3;
                    self.doc.draw_line(
                        page,
                        margin,
                        mid,
                        margin + width,
                        mid,
                        0.6,
                        self.options.palette.removed_accent,
                    )?;
                }
                self.cursor.advance(line_height);
            }
        }
        Ok(())
    }

    /// Banner page separating the text view from the copied pages.
    fn divider_page(&mut self) -> Result<()> {
        let page = self.doc.add_page();
        let (width, height) = self.doc.page_size();
        let margin = self.options.margin;

        let band_y = height * 0.58;
        self.doc
            .draw_rect(page, 0.0, band_y, width, 44.0, self.options.palette.header)?;
        self.doc.draw_text(
            page,
            margin,
            band_y + 16.0,
            "Original pages of the newer version",
            Font::HelveticaBold,
            16.0,
            WHITE,
        )?;

        let mut y = band_y - 28.0;
        let note = [
            "The pages that follow reproduce the newer document verbatim, each",
            "stamped with a header bar. Change markers are placed by character",
            "offset and only approximate where edits occur.",
        ];
        for line in note {
            self.doc.draw_text(
                page,
                margin,
                y,
                line,
                Font::Helvetica,
                9.0,
                self.options.palette.muted,
            )?;
            y -= 13.0;
        }

        if self.options.show_highlights {
            y -= 10.0;
            for kind in [MarkerKind::Added, MarkerKind::Removed, MarkerKind::Modified] {
                let accent = marker_accent(&self.options.palette, kind);
                self.doc.draw_rect(page, margin, y - 1.0, 8.0, 8.0, accent)?;
                self.doc.draw_text(
                    page,
                    margin + 14.0,
                    y,
                    &format!("{} {}", kind.sigil(), kind.label()),
                    Font::Helvetica,
                    9.0,
                    INK,
                )?;
                y -= 14.0;
            }
        }

        Ok(())
    }

    /// Copy the newer document's pages and stamp them.
    ///
    /// A copy failure does not abort the report; a single error page is
    /// substituted and the document is finalized with what was built so far.
    fn overlay_section(
        &mut self,
        diff: &DiffReport,
        right: &VersionRef,
        right_bytes: &[u8],
    ) -> Result<()> {
        let indices = match self.doc.import_pages(right_bytes) {
            Ok(indices) => indices,
            Err(err) => {
                log::warn!("overlay page copy failed, substituting error page: {}", err);
                return self.copy_error_page(&err);
            }
        };

        let total = indices.len();
        for (i, &page) in indices.iter().enumerate() {
            self.stamp_header(page, i + 1, total, right)?;
        }

        if self.options.show_highlights {
            let markers = sample_markers(&diff.spans, total, &self.options);
            for marker in &markers {
                self.draw_marker(indices[marker.page_index], marker)?;
            }

            let annotated = self.options.annotated_pages.min(total);
            for &page in indices.iter().take(annotated) {
                self.overlay_legend(page)?;
            }
        }

        Ok(())
    }

    /// Thin header bar identifying a copied page.
    fn stamp_header(
        &mut self,
        page: usize,
        number: usize,
        total: usize,
        right: &VersionRef,
    ) -> Result<()> {
        let (width, height) = self.doc.page_dimensions(page);
        self.doc.draw_rect(
            page,
            0.0,
            height - HEADER_BAR_HEIGHT,
            width,
            HEADER_BAR_HEIGHT,
            self.options.palette.header,
        )?;
        let label = format!(
            "Combined Document \u{2014} page {} of {} \u{2014} version {}",
            number,
            total,
            right.version_label()
        );
        self.doc.draw_text(
            page,
            10.0,
            height - HEADER_BAR_HEIGHT + 5.5,
            &label,
            Font::HelveticaBold,
            8.5,
            WHITE,
        )?;
        Ok(())
    }

    fn draw_marker(&mut self, page: usize, marker: &ChangeMarker) -> Result<()> {
        let (width, height) = self.doc.page_dimensions(page);
        let usable = height - 2.0 * self.options.margin;
        let y = height - self.options.margin - marker.y * usable;
        let accent = marker_accent(&self.options.palette, marker.kind);

        let x = width - self.options.margin + 6.0;
        self.doc.draw_rect(page, x, y, 8.0, 8.0, accent)?;
        let label_width = self.doc.measure_text(&marker.label, Font::HelveticaOblique, 7.0);
        self.doc.draw_text(
            page,
            x - label_width - 4.0,
            y + 1.5,
            &marker.label,
            Font::HelveticaOblique,
            7.0,
            accent,
        )?;
        Ok(())
    }

    /// Fixed legend box in the lower right corner of an annotated page.
    fn overlay_legend(&mut self, page: usize) -> Result<()> {
        let (width, _height) = self.doc.page_dimensions(page);
        let margin = self.options.margin;
        let box_width = 110.0;
        let box_height = 50.0;
        let x = width - margin - box_width;
        let y = margin;

        self.doc
            .draw_rect(page, x, y, box_width, box_height, Rgb::new(0.97, 0.97, 0.97))?;
        self.doc.draw_line(
            page,
            x,
            y + box_height,
            x + box_width,
            y + box_height,
            0.8,
            self.options.palette.header,
        )?;

        let mut row_y = y + box_height - 14.0;
        for kind in [MarkerKind::Added, MarkerKind::Removed, MarkerKind::Modified] {
            let accent = marker_accent(&self.options.palette, kind);
            self.doc.draw_rect(page, x + 6.0, row_y - 1.0, 7.0, 7.0, accent)?;
            self.doc.draw_text(
                page,
                x + 18.0,
                row_y,
                &format!("{} {}", kind.sigil(), kind.label()),
                Font::Helvetica,
                8.0,
                INK,
            )?;
            row_y -= 14.0;
        }
        Ok(())
    }

    /// Substitute page describing a failed page copy.
    fn copy_error_page(&mut self, err: &Error) -> Result<()> {
        let page = self.doc.add_page();
        let margin = self.options.margin;
        let mut y = self.options.top_y();

        self.doc.draw_text(
            page,
            margin,
            y,
            "Original pages unavailable",
            Font::HelveticaBold,
            14.0,
            INK,
        )?;
        y -= 24.0;

        self.doc.draw_text(
            page,
            margin,
            y,
            "The newer document's pages could not be copied into this report.",
            Font::Helvetica,
            self.options.body_size,
            INK,
        )?;
        y -= self.options.line_height;

        for chunk in wrap_line(&format!("Reason: {}", err), self.options.wrap_budget) {
            self.doc.draw_text(
                page,
                margin,
                y,
                chunk,
                Font::Helvetica,
                self.options.body_size,
                self.options.palette.muted,
            )?;
            y -= self.options.line_height;
        }

        Ok(())
    }
}

/// Smallest well-formed PDF the crate can emit.
///
/// Returned when even the failure page cannot be rendered; the assembly
/// tracks byte offsets so the cross-reference table is exact.
pub fn emergency_pdf() -> Vec<u8> {
    let stream = "BT /F1 12 Tf 72 720 Td (Document comparison failed.) Tj ET";
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    pdf.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unchanged(text: &str) -> DiffSpan {
        DiffSpan::Unchanged { text: text.into() }
    }

    fn modified(old: &str, new: &str) -> DiffSpan {
        DiffSpan::Modified {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Spans spreading `changes` modifications evenly through filler text.
    fn spread_spans(changes: usize) -> Vec<DiffSpan> {
        let mut spans = Vec::new();
        for i in 0..changes {
            spans.push(unchanged(&"x".repeat(200)));
            spans.push(modified(&format!("old{}", i), &format!("new{}", i)));
        }
        spans.push(unchanged(&"x".repeat(200)));
        spans
    }

    #[test]
    fn test_markers_limited_to_annotated_pages() {
        let options = RenderOptions::default();
        let markers = sample_markers(&spread_spans(40), 10, &options);

        assert!(!markers.is_empty());
        for marker in &markers {
            assert!(marker.page_index < options.annotated_pages);
            assert!((0.0..=1.0).contains(&marker.y));
        }
    }

    #[test]
    fn test_markers_capped_per_page() {
        let options = RenderOptions::default();
        let markers = sample_markers(&spread_spans(60), 5, &options);

        for page in 0..options.annotated_pages {
            let on_page = markers.iter().filter(|m| m.page_index == page).count();
            assert!(on_page <= options.markers_per_page, "page {}: {}", page, on_page);
        }
    }

    #[test]
    fn test_no_markers_without_changes() {
        let options = RenderOptions::default();
        let spans = vec![unchanged("stable text")];
        assert!(sample_markers(&spans, 3, &options).is_empty());
    }

    #[test]
    fn test_no_markers_without_pages() {
        let options = RenderOptions::default();
        assert!(sample_markers(&spread_spans(3), 0, &options).is_empty());
    }

    #[test]
    fn test_marker_kinds_follow_span_kinds() {
        let options = RenderOptions::default();
        let spans = vec![
            DiffSpan::Added {
                text: "fresh".into(),
            },
            unchanged(&"y".repeat(50)),
            DiffSpan::Removed {
                text: "stale".into(),
            },
        ];
        let markers = sample_markers(&spans, 1, &options);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, MarkerKind::Added);
        assert_eq!(markers[1].kind, MarkerKind::Removed);
        assert!(markers[0].label.starts_with("+ "));
        assert!(markers[1].label.starts_with("- "));
    }

    #[test]
    fn test_removed_marker_labels_use_old_text() {
        let span = DiffSpan::Removed {
            text: "vanished words".into(),
        };
        let label = marker_label(MarkerKind::Removed, &span);
        assert_eq!(label, "- vanished words");
    }

    #[test]
    fn test_excerpt_truncates_long_text() {
        let text = "word ".repeat(30);
        let short = excerpt(&text, 20);
        assert!(short.ends_with("..."));
        assert!(short.chars().count() <= 23);
    }

    #[test]
    fn test_excerpt_flattens_whitespace() {
        assert_eq!(excerpt("two\n  lines", 32), "two lines");
    }

    #[test]
    fn test_emergency_pdf_is_loadable() {
        let bytes = emergency_pdf();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("comparison failed"), "got: {:?}", text);
    }

    #[test]
    fn test_render_failure_names_the_failure() {
        let options = RenderOptions::default();
        let error = Error::ContentUnavailable {
            side: crate::error::Side::Left,
            reason: "binary object not found: abc".into(),
        };
        let bytes = ReportRenderer::render_failure(&options, &error).unwrap();

        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Comparison unavailable"));
        assert!(text.contains("content_unavailable"));
        assert!(text.contains("left version"));
    }
}
