//! Natural width of a single unwrapped line of text.
//!
//! Advance model (em units per cell):
//! - monospace families: 0.5 for every cluster class.
//! - proportional: uppercase 0.65, lowercase + digits 0.5, space 0.25,
//!   ASCII punctuation 0.3, anything else 0.55.
//!
//! Bold weights widen glyph advances by 5%. Letter spacing applies after every
//! cluster, word spacing after every space. Spacing is not scaled by weight.

use crate::font::{FontSpec, TextTransform};
use crate::segment::normalize_and_segment;

const MONO_EM: f64 = 0.5;
const BOLD_FACTOR: f64 = 1.05;

/// Em advance of one cell of `cluster` for the given family kind.
pub fn advance_em(cluster: &str, monospace: bool) -> f64 {
    if monospace {
        return MONO_EM;
    }
    let mut chars = cluster.chars();
    match (chars.next(), chars.next()) {
        (Some(' '), None) => 0.25,
        (Some(c), _) if c.is_ascii_uppercase() => 0.65,
        (Some(c), _) if c.is_ascii_lowercase() || c.is_ascii_digit() => 0.5,
        (Some(c), _) if c.is_ascii_punctuation() => 0.3,
        (Some(_), _) => 0.55,
        (None, _) => 0.0,
    }
}

/// Apply a CSS `text-transform` to `text`.
pub fn apply_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut at_word_start = true;
            for c in text.chars() {
                if at_word_start && c.is_alphabetic() {
                    out.extend(c.to_uppercase());
                } else {
                    out.push(c);
                }
                at_word_start = c.is_whitespace();
            }
            out
        }
    }
}

/// Measure the natural pixel width of `text` laid out on one line with `font`.
pub fn measure_run(text: &str, font: &FontSpec) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let transformed = apply_transform(text, font.text_transform);
    let (_normalized, segments) = normalize_and_segment(&transformed);
    let monospace = font.is_monospace();
    let weight = if font.is_bold() { BOLD_FACTOR } else { 1.0 };

    let mut width = 0.0;
    for seg in &segments {
        let glyph = f64::from(seg.width) * advance_em(&seg.cluster, monospace) * font.size_px;
        width += glyph * weight + font.letter_spacing_px;
        if seg.cluster == " " {
            width += font.word_spacing_px;
        }
    }
    width.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(size: f64) -> FontSpec {
        FontSpec::new("monospace", size)
    }

    #[test]
    fn monospace_is_half_em_per_cell() {
        assert_eq!(measure_run("abcdefghijklmn", &mono(20.0)), 140.0);
        assert_eq!(measure_run("0123456789", &mono(17.0)), 85.0);
    }

    #[test]
    fn wide_clusters_take_two_cells() {
        assert_eq!(measure_run("界", &mono(20.0)), 20.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(measure_run("", &FontSpec::default()), 0.0);
    }

    #[test]
    fn spacing_applies_per_cluster_and_space() {
        let mut f = mono(10.0);
        f.letter_spacing_px = 1.0;
        f.word_spacing_px = 2.0;
        // 3 clusters * 5px + 3 * 1px letter + 1 * 2px word
        assert_eq!(measure_run("a b", &f), 20.0);
    }

    #[test]
    fn bold_and_uppercase_widen_proportional_text() {
        let regular = FontSpec::new("sans-serif", 16.0);
        let mut bold = regular.clone();
        bold.weight = 700;
        let mut upper = regular.clone();
        upper.text_transform = TextTransform::Uppercase;
        let base = measure_run("label", &regular);
        assert!(measure_run("label", &bold) > base);
        assert!(measure_run("label", &upper) > base);
    }

    #[test]
    fn capitalize_only_word_starts() {
        assert_eq!(
            apply_transform("hello big world", TextTransform::Capitalize),
            "Hello Big World"
        );
    }
}
