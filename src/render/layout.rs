//! Page cursor and character-budget word wrapping.

/// Layout position threaded through the renderer.
///
/// PDF coordinates grow upward, so `y` decreases as lines are written. A new
/// page must be started whenever an advance would push `y` below
/// `margin_bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCursor {
    /// Zero-based index of the current output page.
    pub page: usize,

    /// Baseline y of the next line, in points from the page bottom.
    pub y: f32,

    /// Page width in points.
    pub page_width: f32,

    /// Page height in points.
    pub page_height: f32,

    /// Lower bound for `y`; pages use a uniform margin.
    pub margin_bottom: f32,
}

impl RenderCursor {
    /// Cursor at the top of the given page.
    pub fn at_page(page: usize, page_width: f32, page_height: f32, margin: f32) -> Self {
        Self {
            page,
            y: page_height - margin,
            page_width,
            page_height,
            margin_bottom: margin,
        }
    }

    /// Whether advancing by `height` would cross the bottom margin.
    pub fn needs_page_break(&self, height: f32) -> bool {
        self.y - height < self.margin_bottom
    }

    /// Move the baseline down by `height`.
    pub fn advance(&mut self, height: f32) {
        self.y -= height;
    }

    /// Move to the top of the next page.
    pub fn next_page(&mut self) {
        self.page += 1;
        self.y = self.page_height - self.margin_bottom;
    }
}

/// Greedily wrap one logical line into chunks of at most `budget` characters.
///
/// When the cut would land mid-word, it backtracks to the last space within
/// the budget; a single word longer than the budget is cut hard. Wrapping is
/// character-budgeted, not pixel-measured; only background rectangles use
/// true text measurement. A budget of zero disables wrapping.
pub fn wrap_line(line: &str, budget: usize) -> Vec<&str> {
    if budget == 0 {
        return vec![line];
    }

    let mut chunks = Vec::new();
    let mut rest = line;

    loop {
        if rest.chars().count() <= budget {
            chunks.push(rest);
            break;
        }

        let cut = byte_index_of_char(rest, budget);
        let mid_word = !rest[cut..].starts_with(' ') && !rest[..cut].ends_with(' ');
        let split = if mid_word {
            match rest[..cut].rfind(' ') {
                Some(pos) if pos > 0 => pos,
                _ => cut,
            }
        } else {
            cut
        };

        chunks.push(rest[..split].trim_end());
        rest = rest[split..].trim_start();
        if rest.is_empty() {
            break;
        }
    }

    chunks
}

/// Byte index of the `n`-th character of `s`.
fn byte_index_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advances_downward() {
        let mut cursor = RenderCursor::at_page(0, 612.0, 792.0, 54.0);
        assert_eq!(cursor.y, 738.0);

        cursor.advance(14.0);
        assert_eq!(cursor.y, 724.0);
        assert_eq!(cursor.page, 0);
    }

    #[test]
    fn test_cursor_page_break_detection() {
        let mut cursor = RenderCursor::at_page(0, 612.0, 792.0, 54.0);
        assert!(!cursor.needs_page_break(14.0));

        cursor.y = 60.0;
        assert!(cursor.needs_page_break(14.0));
        assert!(!cursor.needs_page_break(6.0));
    }

    #[test]
    fn test_cursor_next_page_resets_y() {
        let mut cursor = RenderCursor::at_page(0, 612.0, 792.0, 54.0);
        cursor.advance(600.0);
        cursor.next_page();

        assert_eq!(cursor.page, 1);
        assert_eq!(cursor.y, 738.0);
    }

    #[test]
    fn test_wrap_short_line_is_identity() {
        let chunks = wrap_line("short line", 80);
        assert_eq!(chunks, vec!["short line"]);
    }

    #[test]
    fn test_wrap_exact_budget_is_identity() {
        let line = "x".repeat(80);
        let chunks = wrap_line(&line, 80);
        assert_eq!(chunks, vec![line.as_str()]);
    }

    #[test]
    fn test_wrap_splits_at_space_on_boundary() {
        // The 8th character is a space, so no backtracking is needed.
        let chunks = wrap_line("aaa bbb ccc", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_backtracks_mid_word() {
        // Budget cuts inside "bbbb"; the wrap falls back to the last space.
        let chunks = wrap_line("aaaa bbbb", 6);
        assert_eq!(chunks, vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn test_wrap_hard_cuts_long_words() {
        let chunks = wrap_line("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_chunks_stay_within_budget() {
        let line = "the quick brown fox jumps over the lazy dog and keeps on running";
        for chunk in wrap_line(line, 10) {
            assert!(chunk.chars().count() <= 10, "chunk too long: {:?}", chunk);
        }
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        // Five two-byte characters; a byte-based cut would split inside one.
        let chunks = wrap_line("ééééé", 3);
        assert_eq!(chunks, vec!["ééé", "éé"]);
    }

    #[test]
    fn test_wrap_zero_budget_disables_wrapping() {
        let line = "anything at all";
        assert_eq!(wrap_line(line, 0), vec![line]);
    }
}
