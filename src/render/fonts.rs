//! Built-in Helvetica metrics and WinAnsi text encoding.
//!
//! The report uses the standard 14 Helvetica family, so no font programs are
//! embedded; widths come from the Adobe AFM tables (units of 1/1000 em).

/// Typefaces available to the report renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica regular
    Helvetica,
    /// Helvetica bold
    HelveticaBold,
    /// Helvetica oblique
    HelveticaOblique,
}

impl Font {
    /// All fonts registered on every output page.
    pub const ALL: [Font; 3] = [Font::Helvetica, Font::HelveticaBold, Font::HelveticaOblique];

    /// PDF BaseFont name.
    pub fn base_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource name the builder registers the font under.
    ///
    /// These names must not collide with font resources of copied source
    /// pages, which conventionally use `F1`, `F2`, ...
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "XD1",
            Font::HelveticaBold => "XD2",
            Font::HelveticaOblique => "XD3",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            // Oblique shares the regular metrics.
            Font::Helvetica | Font::HelveticaOblique => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Width used for characters outside the table.
const DEFAULT_WIDTH: u16 = 556;

/// Helvetica AFM widths for characters 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, // ' ' .. ')'
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556, // '*' .. '3'
    556, 556, 556, 556, 556, 556, 278, 278, 584, 584, // '4' .. '='
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, // '>' .. 'G'
    722, 278, 500, 667, 556, 833, 722, 778, 667, 778, // 'H' .. 'Q'
    722, 667, 611, 722, 667, 944, 667, 667, 611, 278, // 'R' .. '['
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, // '\' .. 'e'
    278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 'f' .. 'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, // 'p' .. 'y'
    500, 334, 260, 334, 584,                          // 'z' .. '~'
];

/// Helvetica-Bold AFM widths for characters 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, // ' ' .. ')'
    389, 584, 278, 333, 278, 278, 556, 556, 556, 556, // '*' .. '3'
    556, 556, 556, 556, 556, 556, 333, 333, 584, 584, // '4' .. '='
    584, 611, 975, 722, 722, 722, 722, 667, 611, 778, // '>' .. 'G'
    722, 278, 556, 722, 611, 833, 722, 778, 667, 778, // 'H' .. 'Q'
    722, 667, 611, 722, 667, 944, 667, 667, 611, 333, // 'R' .. '['
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, // '\' .. 'e'
    333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 'f' .. 'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, // 'p' .. 'y'
    500, 389, 280, 389, 584,                          // 'z' .. '~'
];

/// Width of `text` in points when set in `font` at `size`.
pub fn measure(text: &str, font: Font, size: f32) -> f32 {
    let widths = font.widths();
    let total: u32 = text.chars().map(|c| u32::from(char_width(c, widths))).sum();
    total as f32 * size / 1000.0
}

fn char_width(c: char, widths: &[u16; 95]) -> u16 {
    let code = c as u32;
    match code {
        32..=126 => widths[(code - 32) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Encode text as WinAnsi (cp1252) bytes for PDF string operands.
///
/// Characters without a WinAnsi code point become `?`.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> u8 {
    let code = c as u32;
    match code {
        0x20..=0x7e => code as u8,
        0xa0..=0xff => code as u8,
        _ => match c {
            '\t' => b' ',
            '\u{20ac}' => 0x80, // euro sign
            '\u{201a}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201e}' => 0x84,
            '\u{2026}' => 0x85, // horizontal ellipsis
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02c6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8a,
            '\u{2039}' => 0x8b,
            '\u{0152}' => 0x8c,
            '\u{017d}' => 0x8e,
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201c}' => 0x93, // left double quote
            '\u{201d}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en dash
            '\u{2014}' => 0x97, // em dash
            '\u{02dc}' => 0x98,
            '\u{2122}' => 0x99, // trade mark
            '\u{0161}' => 0x9a,
            '\u{203a}' => 0x9b,
            '\u{0153}' => 0x9c,
            '\u{017e}' => 0x9e,
            '\u{0178}' => 0x9f,
            _ => b'?',
        },
    }
}
