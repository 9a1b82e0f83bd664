//! Rendering options and color configuration.

/// RGB color with components in the 0.0 to 1.0 range, as used by the PDF
/// `rg`/`RG` operators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Rgb {
    /// Create a color from components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Colors for background tints, accents, and the header bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Background tint behind added text
    pub added_bg: Rgb,

    /// Background tint behind removed text
    pub removed_bg: Rgb,

    /// Background tint behind the "changed from" half of a modified block
    pub modified_old_bg: Rgb,

    /// Background tint behind the "changed to" half of a modified block
    pub modified_new_bg: Rgb,

    /// Accent for added markers and the added legend swatch
    pub added_accent: Rgb,

    /// Accent for removed markers, strike-through rules, and the removed swatch
    pub removed_accent: Rgb,

    /// Accent for modified markers and the modified swatch
    pub modified_accent: Rgb,

    /// Header bar fill on overlay pages
    pub header: Rgb,

    /// Muted gray for de-emphasized labels and removed text
    pub muted: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            added_bg: Rgb::new(0.85, 0.95, 0.85),
            removed_bg: Rgb::new(0.97, 0.86, 0.86),
            modified_old_bg: Rgb::new(0.98, 0.94, 0.80),
            modified_new_bg: Rgb::new(0.84, 0.90, 0.98),
            added_accent: Rgb::new(0.18, 0.55, 0.27),
            removed_accent: Rgb::new(0.72, 0.18, 0.18),
            modified_accent: Rgb::new(0.78, 0.55, 0.10),
            header: Rgb::new(0.20, 0.30, 0.45),
            muted: Rgb::new(0.45, 0.45, 0.45),
        }
    }
}

/// Options for rendering the comparison report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Page width in points (default: US Letter)
    pub page_width: f32,

    /// Page height in points
    pub page_height: f32,

    /// Uniform page margin in points
    pub margin: f32,

    /// Vertical advance per text line in points
    pub line_height: f32,

    /// Body text size in points
    pub body_size: f32,

    /// Character budget per wrapped line
    pub wrap_budget: usize,

    /// Draw background tints and overlay markers
    pub show_highlights: bool,

    /// Colors used for tints and accents
    pub palette: Palette,

    /// Number of leading overlay pages that receive change markers
    pub annotated_pages: usize,

    /// Maximum number of markers drawn per annotated page
    pub markers_per_page: usize,

    /// Title drawn on the cover page
    pub title: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size in points.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the uniform page margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the line height.
    pub fn with_line_height(mut self, height: f32) -> Self {
        self.line_height = height;
        self
    }

    /// Set the body text size.
    pub fn with_body_size(mut self, size: f32) -> Self {
        self.body_size = size;
        self
    }

    /// Set the character budget for word wrapping.
    pub fn with_wrap_budget(mut self, budget: usize) -> Self {
        self.wrap_budget = budget;
        self
    }

    /// Enable or disable background tints and overlay markers.
    pub fn with_highlights(mut self, show: bool) -> Self {
        self.show_highlights = show;
        self
    }

    /// Set the color palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set how many leading overlay pages receive change markers.
    pub fn with_annotated_pages(mut self, pages: usize) -> Self {
        self.annotated_pages = pages;
        self
    }

    /// Set the maximum number of markers per annotated page.
    pub fn with_markers_per_page(mut self, markers: usize) -> Self {
        self.markers_per_page = markers;
        self
    }

    /// Set the cover page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Baseline y for the first line on a fresh page.
    pub fn top_y(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Usable text width between the margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 54.0,
            line_height: 14.0,
            body_size: 10.0,
            wrap_budget: 80,
            show_highlights: true,
            palette: Palette::default(),
            annotated_pages: 3,
            markers_per_page: 4,
            title: "Document Comparison Report".to_string(),
        }
    }
}
