//! Text extraction: binary document buffers to flat text.
//!
//! Extraction is deliberately lossy: headings, tables and positioning are
//! discarded, leaving a flat string with the source's line breaks. The
//! comparison stages operate on that linear stream.

use crate::error::{Error, Result};
use lopdf::Document;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Sniff the PDF header from bytes.
///
/// # Returns
/// * `Ok(PdfFormat)` if the data starts with a valid PDF header
/// * `Err(Error::UnknownFormat)` if the data is not a PDF
/// * `Err(Error::UnsupportedVersion)` if the version marker is malformed
pub fn sniff_pdf(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }

    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

/// Check if a version string looks like "1.0" to "2.0".
fn is_valid_version(version: &str) -> bool {
    if version.len() != 3 {
        return false;
    }

    let chars: Vec<char> = version.chars().collect();
    chars[0].is_ascii_digit() && chars[1] == '.' && chars[2].is_ascii_digit()
}

/// Check if bytes represent a valid PDF header.
pub fn is_pdf(data: &[u8]) -> bool {
    sniff_pdf(data).is_ok()
}

/// Trait for converting document bytes to plain text.
///
/// Implement this to compare formats other than PDF; the comparison pipeline
/// only ever sees the extracted string.
pub trait TextExtractor: Send + Sync {
    /// Extract flat text from the given document bytes.
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Default [`TextExtractor`] for PDF content, built on lopdf.
#[derive(Debug)]
pub struct PdfTextExtractor {
    newline_run: Regex,
}

impl PdfTextExtractor {
    /// Create a new PDF text extractor.
    pub fn new() -> Self {
        Self {
            newline_run: Regex::new(r"\n{3,}").unwrap(),
        }
    }

    /// Normalize extracted text before it is diffed.
    ///
    /// Applies Unicode NFC, strips trailing whitespace per line, and
    /// collapses runs of three or more newlines to a blank line. Both sides
    /// of a comparison pass through here, so the diff never sees artifacts
    /// of the extraction order.
    fn normalize(&self, text: &str) -> String {
        let text: String = text.nfc().collect();
        let lines: Vec<&str> = text.lines().map(|line| line.trim_end()).collect();
        let joined = lines.join("\n");
        self.newline_run.replace_all(&joined, "\n\n").trim().to_string()
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        sniff_pdf(bytes)?;

        let doc = Document::load_mem(bytes)?;
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let pages = doc.get_pages();
        let mut parts = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            let text = doc
                .extract_text(&[*page_num])
                .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_num, e)))?;
            parts.push(text);
        }

        Ok(self.normalize(&parts.join("\n")))
    }
}
