//! Declared style and the small slice of the cascade the layout oracle needs.
//!
//! Only font properties inherit. Everything else falls back to initial values
//! (or the tag's default `display`) when undeclared.

use core_text::{FontSpec, FontStyle, TextTransform};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteSpace {
    #[default]
    Normal,
    Nowrap,
    Pre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

/// Declared (not computed) style of one element. `None` means "not declared".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    pub width: Option<f64>,
    pub padding_left: Option<f64>,
    pub padding_right: Option<f64>,
    pub display: Option<Display>,
    pub position: Option<Position>,
    pub visibility: Option<Visibility>,
    pub white_space: Option<WhiteSpace>,
    pub overflow_y: Option<Overflow>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub font_style: Option<FontStyle>,
    pub letter_spacing: Option<f64>,
    pub word_spacing: Option<f64>,
    pub text_transform: Option<TextTransform>,
}

impl Style {
    /// Set both horizontal paddings.
    pub fn padding_x(mut self, px: f64) -> Self {
        self.padding_left = Some(px);
        self.padding_right = Some(px);
        self
    }

    pub fn width(mut self, px: f64) -> Self {
        self.width = Some(px);
        self
    }

    pub fn font(mut self, family: impl Into<String>, size_px: f64) -> Self {
        self.font_family = Some(family.into());
        self.font_size = Some(size_px);
        self
    }

    /// Layer this element's declared font properties over the inherited font.
    pub fn cascade_font(&self, inherited: &FontSpec) -> FontSpec {
        FontSpec {
            family: self
                .font_family
                .clone()
                .unwrap_or_else(|| inherited.family.clone()),
            size_px: self.font_size.unwrap_or(inherited.size_px),
            weight: self.font_weight.unwrap_or(inherited.weight),
            style: self.font_style.unwrap_or(inherited.style),
            letter_spacing_px: self.letter_spacing.unwrap_or(inherited.letter_spacing_px),
            word_spacing_px: self.word_spacing.unwrap_or(inherited.word_spacing_px),
            text_transform: self.text_transform.unwrap_or(inherited.text_transform),
        }
    }

    /// Declare every font property from `font` on this style.
    pub fn copy_font_from(&mut self, font: &FontSpec) {
        self.font_family = Some(font.family.clone());
        self.font_size = Some(font.size_px);
        self.font_weight = Some(font.weight);
        self.font_style = Some(font.style);
        self.letter_spacing = Some(font.letter_spacing_px);
        self.word_spacing = Some(font.word_spacing_px);
        self.text_transform = Some(font.text_transform);
    }

    pub fn horizontal_padding(&self) -> (f64, f64) {
        (
            self.padding_left.unwrap_or(0.0),
            self.padding_right.unwrap_or(0.0),
        )
    }
}

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "em", "i", "label", "small", "span", "strong", "sub", "sup",
];

pub fn default_display(tag: &str) -> Display {
    if INLINE_TAGS.contains(&tag) {
        Display::Inline
    } else {
        Display::Block
    }
}
