//! Font description carried by computed style.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// The font-affecting properties of a text run.
///
/// These are the properties a scratch node must copy from its target for its
/// natural width to match what the target would render.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub size_px: f64,
    pub weight: u16,
    pub style: FontStyle,
    pub letter_spacing_px: f64,
    pub word_spacing_px: f64,
    pub text_transform: TextTransform,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("sans-serif", 16.0)
    }
}

const MONOSPACE_FAMILIES: &[&str] = &["monospace", "courier", "courier new", "menlo", "consolas"];

impl FontSpec {
    pub fn new(family: impl Into<String>, size_px: f64) -> Self {
        Self {
            family: family.into(),
            size_px,
            weight: 400,
            style: FontStyle::Normal,
            letter_spacing_px: 0.0,
            word_spacing_px: 0.0,
            text_transform: TextTransform::None,
        }
    }

    /// True when the first recognizable family in the (comma separated) list is monospace.
    pub fn is_monospace(&self) -> bool {
        self.family
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
            .any(|f| MONOSPACE_FAMILIES.contains(&f.as_str()))
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }
}
