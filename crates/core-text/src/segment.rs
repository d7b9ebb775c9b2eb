//! Centralized normalization + segmentation adapter.
//!
//! Contract:
//! - Input: &str raw text content (element text, override text, page files).
//! - Output: (normalized NFC String, Vec<Segment>) where each segment is a grapheme cluster
//!   with absolute byte offsets into the normalized string and a cell width.
//! - Guarantees: Clusters are in order, non-overlapping, cover the entire string when concatenated.
//! - Safety: Does not log content; callers should avoid logging raw text.

use crate::egc_width;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cluster: String,
    pub start: usize, // byte offset in normalized string (inclusive)
    pub end: usize,   // byte offset in normalized string (exclusive)
    pub width: u16,   // advance cells
}

/// Normalize to NFC and segment into grapheme clusters with widths and byte ranges.
pub fn normalize_and_segment(input: &str) -> (String, Vec<Segment>) {
    let normalized: String = input.nfc().collect();
    let mut out = Vec::new();
    let mut byte = 0usize;
    for g in normalized.graphemes(true) {
        let len = g.len();
        out.push(Segment {
            cluster: g.to_string(),
            start: byte,
            end: byte + len,
            width: egc_width(g),
        });
        byte += len;
    }
    (normalized, out)
}

/// Collapse runs of ASCII whitespace into a single space, as a `white-space: normal`
/// or `nowrap` line box does. Leading/trailing whitespace is kept as one space.
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_ws = false;
    for c in input.chars() {
        if c.is_ascii_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_equivalence_and_segmentation_single_cluster() {
        let decomposed = "e\u{0301}";
        let composed = "\u{00E9}";
        let (n1, s1) = normalize_and_segment(decomposed);
        let (n2, s2) = normalize_and_segment(composed);
        assert_eq!(n1, n2);
        assert_eq!(s1.len(), 1);
        assert_eq!(s2.len(), 1);
        assert_eq!(s1[0].cluster, "\u{00E9}");
        assert_eq!(s1[0].width, s2[0].width);
    }

    #[test]
    fn segmentation_covers_input() {
        let s = "漢😀👨‍👩‍👧‍👦a";
        let (normalized, segs) = normalize_and_segment(s);
        assert_eq!(segs.len(), 4);
        let mut prev_end = 0usize;
        let mut join = String::new();
        for seg in &segs {
            assert_eq!(seg.start, prev_end);
            prev_end = seg.end;
            join.push_str(&seg.cluster);
        }
        assert_eq!(join, normalized);
    }

    #[test]
    fn collapse_runs() {
        assert_eq!(collapse_whitespace("a  b\n\tc"), "a b c");
        assert_eq!(collapse_whitespace("  lead"), " lead");
        assert_eq!(collapse_whitespace(""), "");
    }
}
