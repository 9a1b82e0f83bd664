//! Word-level diff between two extracted texts.
//!
//! The edit script is computed at word granularity (whitespace runs are
//! tokens too, so concatenating span texts reproduces each input exactly),
//! then adjacent remove+add pairs are fused into `Modified` spans. The fused
//! span sequence is the single source of truth for the rendered views and
//! the change counters.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

/// One contiguous run of text classified against the other version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffSpan {
    /// Text present in both versions.
    Unchanged {
        /// The shared text.
        text: String,
    },

    /// Text present only in the newer version.
    Added {
        /// The inserted text.
        text: String,
    },

    /// Text present only in the older version.
    Removed {
        /// The deleted text.
        text: String,
    },

    /// Text replaced between versions (a fused remove+add pair).
    Modified {
        /// Text as it appeared in the older version.
        old: String,
        /// Text as it appears in the newer version.
        new: String,
    },
}

impl DiffSpan {
    /// Text this span contributes to the older version, if any.
    pub fn old_text(&self) -> Option<&str> {
        match self {
            DiffSpan::Unchanged { text } | DiffSpan::Removed { text } => Some(text),
            DiffSpan::Modified { old, .. } => Some(old),
            DiffSpan::Added { .. } => None,
        }
    }

    /// Text this span contributes to the newer version, if any.
    pub fn new_text(&self) -> Option<&str> {
        match self {
            DiffSpan::Unchanged { text } | DiffSpan::Added { text } => Some(text),
            DiffSpan::Modified { new, .. } => Some(new),
            DiffSpan::Removed { .. } => None,
        }
    }
}

/// Span counts per kind, tallied over the fused sequence.
///
/// These count spans, not characters, and are derived from the span list in
/// one pass; a `Modified` span increments only `modified`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    /// Number of `Added` spans.
    pub added: usize,
    /// Number of `Removed` spans.
    pub removed: usize,
    /// Number of `Modified` spans.
    pub modified: usize,
    /// Number of `Unchanged` spans.
    pub unchanged: usize,
}

impl ChangeCounts {
    /// Tally counts from a span sequence.
    pub fn tally(spans: &[DiffSpan]) -> Self {
        let mut counts = Self::default();
        for span in spans {
            match span {
                DiffSpan::Unchanged { .. } => counts.unchanged += 1,
                DiffSpan::Added { .. } => counts.added += 1,
                DiffSpan::Removed { .. } => counts.removed += 1,
                DiffSpan::Modified { .. } => counts.modified += 1,
            }
        }
        counts
    }

    /// Total number of changed spans.
    pub fn total_changes(&self) -> usize {
        self.added + self.removed + self.modified
    }

    /// Whether any span differs between the versions.
    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

/// Result of comparing two texts: the fused spans and their counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Fused spans in document order.
    pub spans: Vec<DiffSpan>,

    /// Span counts per kind.
    pub counts: ChangeCounts,
}

impl DiffReport {
    /// Compare two texts.
    ///
    /// Word-granularity Myers diff, same-tag runs coalesced, then adjacent
    /// remove+add pairs fused into `Modified` spans.
    pub fn compute(left: &str, right: &str) -> Self {
        let spans = fuse_spans(raw_spans(left, right));
        let counts = ChangeCounts::tally(&spans);
        Self { spans, counts }
    }

    /// Concatenated old-side text; equals the left input exactly.
    pub fn left_text(&self) -> String {
        self.spans.iter().filter_map(DiffSpan::old_text).collect()
    }

    /// Concatenated new-side text; equals the right input exactly.
    pub fn right_text(&self) -> String {
        self.spans.iter().filter_map(DiffSpan::new_text).collect()
    }

    /// Serialize the full report to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let result = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };

        result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
    }

    /// Compact JSON summary of the comparison statistics.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "span_count": self.spans.len(),
            "added": self.counts.added,
            "removed": self.counts.removed,
            "modified": self.counts.modified,
            "unchanged": self.counts.unchanged,
            "has_changes": self.counts.has_changes(),
        })
    }
}

/// Compute the raw edit script: same-tag token runs coalesced into spans.
fn raw_spans(left: &str, right: &str) -> Vec<DiffSpan> {
    if left.is_empty() && right.is_empty() {
        return Vec::new();
    }
    if left == right {
        return vec![DiffSpan::Unchanged {
            text: left.to_string(),
        }];
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_words(left, right);

    let mut spans: Vec<DiffSpan> = Vec::new();
    for change in diff.iter_all_changes() {
        let value = change.value();
        match (change.tag(), spans.last_mut()) {
            (ChangeTag::Equal, Some(DiffSpan::Unchanged { text })) => text.push_str(value),
            (ChangeTag::Delete, Some(DiffSpan::Removed { text })) => text.push_str(value),
            (ChangeTag::Insert, Some(DiffSpan::Added { text })) => text.push_str(value),
            (ChangeTag::Equal, _) => spans.push(DiffSpan::Unchanged {
                text: value.to_string(),
            }),
            (ChangeTag::Delete, _) => spans.push(DiffSpan::Removed {
                text: value.to_string(),
            }),
            (ChangeTag::Insert, _) => spans.push(DiffSpan::Added {
                text: value.to_string(),
            }),
        }
    }
    spans
}

/// Fuse each `Removed` immediately followed by an `Added` into one
/// `Modified` span.
///
/// Single lookahead, non-overlapping: the scan advances past a fused pair,
/// so in `[Removed, Added, Added]` only the first pair fuses and the second
/// `Added` stays standalone.
fn fuse_spans(raw: Vec<DiffSpan>) -> Vec<DiffSpan> {
    let mut fused = Vec::with_capacity(raw.len());
    // Text of a Removed span awaiting its potential Added partner.
    let mut pending: Option<String> = None;

    for span in raw {
        match (pending.take(), span) {
            (Some(old), DiffSpan::Added { text: new }) => {
                fused.push(DiffSpan::Modified { old, new });
            }
            (Some(old), DiffSpan::Removed { text }) => {
                fused.push(DiffSpan::Removed { text: old });
                pending = Some(text);
            }
            (Some(old), other) => {
                fused.push(DiffSpan::Removed { text: old });
                fused.push(other);
            }
            (None, DiffSpan::Removed { text }) => pending = Some(text),
            (None, other) => fused.push(other),
        }
    }

    if let Some(old) = pending {
        fused.push(DiffSpan::Removed { text: old });
    }

    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unchanged(text: &str) -> DiffSpan {
        DiffSpan::Unchanged { text: text.into() }
    }

    fn added(text: &str) -> DiffSpan {
        DiffSpan::Added { text: text.into() }
    }

    fn removed(text: &str) -> DiffSpan {
        DiffSpan::Removed { text: text.into() }
    }

    fn assert_reconstructs(left: &str, right: &str) {
        let report = DiffReport::compute(left, right);
        assert_eq!(report.left_text(), left, "old side must reconstruct");
        assert_eq!(report.right_text(), right, "new side must reconstruct");
    }

    #[test]
    fn test_identical_texts_yield_single_unchanged_span() {
        let text = "The quick brown fox jumps over the lazy dog.";
        let report = DiffReport::compute(text, text);

        assert_eq!(report.spans, vec![unchanged(text)]);
        assert_eq!(report.counts.total_changes(), 0);
        assert!(!report.counts.has_changes());
    }

    #[test]
    fn test_single_word_replacement() {
        let report = DiffReport::compute("A B C", "A X C");

        assert_eq!(
            report.spans,
            vec![
                unchanged("A "),
                DiffSpan::Modified {
                    old: "B".into(),
                    new: "X".into(),
                },
                unchanged(" C"),
            ]
        );
        assert_eq!(report.counts.modified, 1);
        assert_eq!(report.counts.added, 0);
        assert_eq!(report.counts.removed, 0);
    }

    #[test]
    fn test_empty_left_is_all_added() {
        let report = DiffReport::compute("", "new content here");
        assert_eq!(report.spans, vec![added("new content here")]);
        assert_eq!(report.counts.added, 1);
        assert_eq!(report.counts.removed, 0);
    }

    #[test]
    fn test_empty_right_is_all_removed() {
        let report = DiffReport::compute("old content here", "");
        assert_eq!(report.spans, vec![removed("old content here")]);
        assert_eq!(report.counts.removed, 1);
    }

    #[test]
    fn test_both_empty_yields_no_spans() {
        let report = DiffReport::compute("", "");
        assert!(report.spans.is_empty());
        assert_eq!(report.counts, ChangeCounts::default());
    }

    #[test]
    fn test_reconstruction_law() {
        assert_reconstructs("A B C", "A X C");
        assert_reconstructs("one two three", "one two three four");
        assert_reconstructs("alpha beta gamma", "gamma beta");
        assert_reconstructs("line one\nline two\n", "line one\nline 2\n");
        assert_reconstructs("  leading spaces", "trailing spaces  ");
        assert_reconstructs("", "only right");
        assert_reconstructs("only left", "");
    }

    #[test]
    fn test_fusion_is_single_lookahead() {
        let raw = vec![removed("B"), added("X"), added("Y")];
        let fused = fuse_spans(raw);

        assert_eq!(
            fused,
            vec![
                DiffSpan::Modified {
                    old: "B".into(),
                    new: "X".into(),
                },
                added("Y"),
            ]
        );
    }

    #[test]
    fn test_fusion_does_not_pair_added_then_removed() {
        let raw = vec![added("X"), removed("B")];
        let fused = fuse_spans(raw);
        assert_eq!(fused, vec![added("X"), removed("B")]);
    }

    #[test]
    fn test_fusion_handles_consecutive_removed() {
        let raw = vec![removed("A"), removed("B"), added("X")];
        let fused = fuse_spans(raw);

        assert_eq!(
            fused,
            vec![
                removed("A"),
                DiffSpan::Modified {
                    old: "B".into(),
                    new: "X".into(),
                },
            ]
        );
    }

    #[test]
    fn test_fusion_flushes_trailing_removed() {
        let raw = vec![unchanged("A "), removed("B")];
        let fused = fuse_spans(raw);
        assert_eq!(fused, vec![unchanged("A "), removed("B")]);
    }

    #[test]
    fn test_pure_insertion_stays_added() {
        let report = DiffReport::compute("one two", "one extra two");
        assert_eq!(report.counts.modified, 0);
        assert_eq!(report.counts.added, 1);
        assert_eq!(report.counts.removed, 0);
        assert_eq!(report.right_text(), "one extra two");
    }

    #[test]
    fn test_counts_tally_each_span_once() {
        let spans = vec![
            unchanged("a"),
            DiffSpan::Modified {
                old: "b".into(),
                new: "c".into(),
            },
            added("d"),
            removed("e"),
        ];
        let counts = ChangeCounts::tally(&spans);

        assert_eq!(counts.unchanged, 1);
        assert_eq!(counts.modified, 1);
        assert_eq!(counts.added, 1);
        assert_eq!(counts.removed, 1);
        assert_eq!(counts.total_changes(), 3);
    }

    #[test]
    fn test_span_serialization_is_tagged() {
        let span = DiffSpan::Modified {
            old: "B".into(),
            new: "X".into(),
        };
        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"kind\":\"modified\""));
        assert!(json.contains("\"old\":\"B\""));
    }

    #[test]
    fn test_to_json_pretty() {
        let report = DiffReport::compute("alpha beta gamma", "beta gamma delta");
        let json = report.to_json(true).unwrap();

        assert!(json.contains('\n')); // Pretty has newlines
        assert!(json.contains("\"kind\": \"removed\""));
        assert!(json.contains("\"kind\": \"unchanged\""));
        assert!(json.contains("\"kind\": \"added\""));
    }

    #[test]
    fn test_to_json_compact() {
        let report = DiffReport::compute("A B C", "A X C");
        let json = report.to_json(false).unwrap();

        assert!(!json.contains('\n')); // Compact has no newlines
        assert!(json.contains("\"kind\":\"unchanged\""));
        assert!(json.contains("\"kind\":\"modified\""));
        assert!(json.contains("\"counts\""));
    }

    #[test]
    fn test_summary_reports_counts() {
        let report = DiffReport::compute("A B C", "A X C");
        let summary = report.summary();
        assert_eq!(summary["modified"], 1);
        assert_eq!(summary["has_changes"], true);
    }

    #[test]
    fn test_multiline_texts() {
        let left = "Heading\n\nFirst paragraph stays.\nSecond paragraph goes.";
        let right = "Heading\n\nFirst paragraph stays.\nSecond paragraph changed.";
        let report = DiffReport::compute(left, right);

        assert!(report.counts.has_changes());
        assert_eq!(report.left_text(), left);
        assert_eq!(report.right_text(), right);
    }
}
