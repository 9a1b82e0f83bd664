//! Rendering module for assembling the comparison report PDF.

mod fonts;
mod layout;
mod options;
mod output;
mod report;

pub use fonts::{encode_winansi, measure, Font};
pub use layout::{wrap_line, RenderCursor};
pub use options::{Palette, RenderOptions, Rgb};
pub use output::OutputDocument;
pub use report::{emergency_pdf, sample_markers, ChangeMarker, MarkerKind, ReportRenderer};
