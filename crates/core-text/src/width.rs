//! Cell width of one grapheme cluster.
//!
//! Pixel measurement multiplies cells by a per-class em advance, so a cluster
//! counted as two cells renders twice as wide as one counted as one. When in
//! doubt the classifier picks the wider answer: reporting truncation a pixel
//! early is preferable to hiding it.

use unicode_width::UnicodeWidthChar;

/// What kind of cluster a slice is, as far as width is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgcKind {
    Ascii,
    Narrow,
    Wide,
    /// Any emoji presentation: single pictograph, modifier, keycap, flag or ZWJ family.
    Emoji,
    /// Base plus combining marks; `true` when the base itself is wide.
    Combining(bool),
    Empty,
}

const KEYCAP: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

// Emoji blocks plus the misc symbol/dingbat ranges commonly shown as emoji.
fn is_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}'
        | '\u{1AB0}'..='\u{1AFF}'
        | '\u{1DC0}'..='\u{1DFF}'
        | '\u{20D0}'..='\u{20FF}'
        | '\u{FE20}'..='\u{FE2F}')
}

fn is_wide(c: char) -> bool {
    c.width() == Some(2)
}

pub fn classify(egc: &str) -> EgcKind {
    let mut chars = egc.chars();
    let Some(base) = chars.next() else {
        return EgcKind::Empty;
    };
    let rest: Vec<char> = chars.collect();

    if rest.is_empty() {
        return match base {
            c if c.is_ascii() => EgcKind::Ascii,
            c if is_pictographic(c) || is_regional_indicator(c) => EgcKind::Emoji,
            c if is_wide(c) => EgcKind::Wide,
            _ => EgcKind::Narrow,
        };
    }

    let all = || std::iter::once(base).chain(rest.iter().copied());
    let keycap = rest.last() == Some(&KEYCAP) && (base.is_ascii_digit() || base == '#' || base == '*');
    let flag = rest.len() == 1 && is_regional_indicator(base) && is_regional_indicator(rest[0]);
    let emoji = all().any(|c| is_pictographic(c) || is_skin_tone(c));

    if keycap || flag || emoji {
        return EgcKind::Emoji;
    }
    if rest.iter().copied().any(is_combining) {
        return EgcKind::Combining(is_wide(base));
    }
    if all().any(is_wide) {
        return EgcKind::Wide;
    }
    EgcKind::Narrow
}

/// Advance cells of a single grapheme cluster; empty input is 0.
pub fn egc_width(egc: &str) -> u16 {
    match classify(egc) {
        EgcKind::Empty => 0,
        EgcKind::Ascii | EgcKind::Narrow | EgcKind::Combining(false) => 1,
        EgcKind::Wide | EgcKind::Emoji | EgcKind::Combining(true) => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_narrow() {
        assert_eq!(classify("A"), EgcKind::Ascii);
        assert_eq!(egc_width("a"), 1);
        assert_eq!(egc_width("é"), 1);
    }

    #[test]
    fn wide_cjk() {
        assert_eq!(classify("界"), EgcKind::Wide);
        assert_eq!(egc_width("界"), 2);
    }

    #[test]
    fn emoji_sequences_are_two_cells() {
        for egc in ["😀", "🇺🇸", "1️⃣", "2\u{20E3}", "👨‍👩‍👧‍👦", "👍🏻", "🇺"] {
            assert_eq!(classify(egc), EgcKind::Emoji, "{egc:?}");
            assert_eq!(egc_width(egc), 2, "{egc:?}");
        }
    }

    #[test]
    fn combining_follows_base() {
        assert_eq!(classify("e\u{0301}"), EgcKind::Combining(false));
        assert_eq!(egc_width("e\u{0301}"), 1);
        assert_eq!(egc_width("界\u{0301}"), 2);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(classify(""), EgcKind::Empty);
        assert_eq!(egc_width(""), 0);
    }
}
