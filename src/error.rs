//! Error types for the pdfdiff library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfdiff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two compared documents an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The older version (first argument of a comparison).
    Left,
    /// The newer version (second argument of a comparison).
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Error types that can occur while resolving, diffing, or rendering.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing document bytes.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A resolved binary reference is not a well-formed identifier.
    #[error("Invalid binary reference: {0:?}")]
    InvalidReference(String),

    /// The binary content for one side could not be fetched.
    #[error("Content unavailable for {side} version: {reason}")]
    ContentUnavailable {
        /// Which version was missing.
        side: Side,
        /// Underlying fetch failure.
        reason: String,
    },

    /// Text extraction failed for one side.
    #[error("Text extraction failed for {side} version: {reason}")]
    Extraction {
        /// Which version could not be extracted.
        side: Side,
        /// Underlying extraction failure.
        reason: String,
    },

    /// A binary object was not found in the store.
    #[error("Binary object not found: {0}")]
    NotFound(String),

    /// The content is not recognized as a PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version marker is malformed.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted; decryption is not supported.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error assembling or drawing the output document.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Catch-all for failures that escaped the typed stages.
    #[error("Comparison pipeline error: {0}")]
    Pipeline(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl Error {
    /// Short machine-friendly name of the failure kind, used on the
    /// fallback document and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::InvalidReference(_) => "invalid_reference",
            Error::ContentUnavailable { .. } => "content_unavailable",
            Error::Extraction { .. } => "extraction_error",
            Error::NotFound(_) => "not_found",
            Error::UnknownFormat => "unknown_format",
            Error::UnsupportedVersion(_) => "unsupported_version",
            Error::PdfParse(_) => "pdf_parse",
            Error::Encrypted => "encrypted",
            Error::TextExtract(_) => "text_extract",
            Error::Render(_) => "render_error",
            Error::Pipeline(_) => "pipeline_error",
        }
    }

    /// Tag an error raised while handling one side of the comparison.
    ///
    /// Fetch failures become [`Error::ContentUnavailable`]; everything else
    /// becomes [`Error::Extraction`]. Errors that already carry a side are
    /// passed through unchanged.
    pub fn for_side(self, side: Side) -> Self {
        match self {
            Error::ContentUnavailable { .. } | Error::Extraction { .. } => self,
            Error::NotFound(id) => Error::ContentUnavailable {
                side,
                reason: format!("binary object not found: {id}"),
            },
            other => Error::Extraction {
                side,
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::ContentUnavailable {
            side: Side::Left,
            reason: "gone".into(),
        };
        assert_eq!(
            err.to_string(),
            "Content unavailable for left version: gone"
        );
    }

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Left.to_string(), "left");
        assert_eq!(Side::Right.to_string(), "right");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_for_side_tags_fetch_failures() {
        let err = Error::NotFound("abc".into()).for_side(Side::Right);
        assert!(matches!(
            err,
            Error::ContentUnavailable {
                side: Side::Right,
                ..
            }
        ));

        let err = Error::UnknownFormat.for_side(Side::Left);
        assert!(matches!(err, Error::Extraction { side: Side::Left, .. }));
    }

    #[test]
    fn test_for_side_keeps_existing_side() {
        let err = Error::ContentUnavailable {
            side: Side::Left,
            reason: "x".into(),
        }
        .for_side(Side::Right);
        assert!(matches!(err, Error::ContentUnavailable { side: Side::Left, .. }));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Error::UnknownFormat.kind(), "unknown_format");
        assert_eq!(Error::Render("x".into()).kind(), "render_error");
    }
}
