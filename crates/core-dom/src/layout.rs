//! Geometry oracle.
//!
//! Single-line layout model:
//! - declared `width` + horizontal padding is the border box (content-box sizing);
//! - `auto` width on inline, inline-block and out-of-flow boxes shrinks to the
//!   natural width of their content;
//! - `auto` width on in-flow blocks fills the containing block's content box;
//! - `<body>` fills the viewport; `display: none` boxes and detached nodes are 0 wide.
//!
//! Natural content width concatenates inline content on one line and takes the
//! widest block child. Whitespace collapses unless `white-space: pre`.

use core_text::segment::collapse_whitespace;
use core_text::{FontSpec, measure_run};

use crate::error::{DomError, Result};
use crate::style::{Display, Overflow, Position, WhiteSpace, default_display};
use crate::{Document, Element, Fault, NodeId, NodeKind};

/// A live range spanning all child nodes of one container, like a platform
/// `Range` after `selectNodeContents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub container: NodeId,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl TextRange {
    /// Width of the union of the boxes the range covers.
    pub fn bounding_width(&self, doc: &Document) -> Result<f64> {
        doc.check_geometry(self.container)?;
        if !doc.is_attached(self.container) {
            return Ok(0.0);
        }
        let children = doc.children(self.container);
        let end = self.end_offset.min(children.len());
        let start = self.start_offset.min(end);
        let font = doc.computed_font(self.container)?;
        let white_space = doc.white_space(self.container);
        let mut inline = 0.0;
        let mut widest_block: f64 = 0.0;
        for child in &children[start..end] {
            let (w, is_block) = doc.child_contribution(*child, &font, white_space)?;
            if is_block {
                widest_block = widest_block.max(w);
            } else {
                inline += w;
            }
        }
        Ok(f64::max(inline, widest_block))
    }
}

impl Document {
    pub(crate) fn check_geometry(&self, id: NodeId) -> Result<()> {
        match self.fault(id) {
            Some(Fault::Geometry) => Err(DomError::GeometryUnavailable(id)),
            _ => Ok(()),
        }
    }

    fn styled_element(&self, id: NodeId) -> Result<&Element> {
        if self.fault(id) == Some(Fault::Style) {
            return Err(DomError::StyleUnavailable(id));
        }
        self.element(id).ok_or(DomError::NotAnElement(id))
    }

    /// Computed font: declared font properties cascaded from the document default
    /// through every ancestor element.
    pub fn computed_font(&self, id: NodeId) -> Result<FontSpec> {
        let el = self.styled_element(id)?;
        let inherited = match self.parent(id) {
            Some(parent) if self.element(parent).is_some() => self.computed_font(parent)?,
            _ => self.default_font.clone(),
        };
        Ok(el.style.cascade_font(&inherited))
    }

    /// Computed horizontal padding `(left, right)` in px.
    pub fn padding(&self, id: NodeId) -> Result<(f64, f64)> {
        Ok(self.styled_element(id)?.style.horizontal_padding())
    }

    pub fn display(&self, id: NodeId) -> Result<Display> {
        let el = self.styled_element(id)?;
        Ok(el.style.display.unwrap_or_else(|| default_display(&el.tag)))
    }

    fn white_space(&self, id: NodeId) -> WhiteSpace {
        self.element(id)
            .and_then(|el| el.style.white_space)
            .or_else(|| self.parent(id).map(|p| self.white_space(p)))
            .unwrap_or_default()
    }

    fn is_out_of_flow(&self, el: &Element) -> bool {
        matches!(
            el.style.position,
            Some(Position::Absolute) | Some(Position::Fixed)
        )
    }

    /// Unrounded border-box width.
    pub fn border_box_width(&self, id: NodeId) -> Result<f64> {
        self.check_geometry(id)?;
        let el = self.styled_element(id)?;
        if !self.is_attached(id) || self.display(id)? == Display::None {
            return Ok(0.0);
        }
        let (pl, pr) = el.style.horizontal_padding();
        if let Some(width) = el.style.width {
            return Ok(width.max(0.0) + pl + pr);
        }
        if id == self.body {
            return Ok(self.viewport_width);
        }
        let shrink = self.is_out_of_flow(el)
            || matches!(self.display(id)?, Display::Inline | Display::InlineBlock);
        if shrink {
            return Ok(self.natural_content_width(id)? + pl + pr);
        }
        self.containing_content_width(id)
    }

    fn containing_content_width(&self, id: NodeId) -> Result<f64> {
        match self.parent(id) {
            Some(parent) if self.element(parent).is_some() => {
                let (pl, pr) = self.padding(parent)?;
                let mut width = self.border_box_width(parent)? - pl - pr;
                if self.element(parent).and_then(|e| e.style.overflow_y) == Some(Overflow::Scroll) {
                    width -= self.scrollbar_width;
                }
                Ok(width.max(0.0))
            }
            _ => Ok(self.viewport_width),
        }
    }

    /// Platform `offsetWidth`: the border box rounded to an integer.
    pub fn offset_width(&self, id: NodeId) -> Result<i64> {
        Ok(self.border_box_width(id)?.round() as i64)
    }

    /// Platform `clientWidth`: padding box minus the vertical scrollbar gutter.
    pub fn client_width(&self, id: NodeId) -> Result<i64> {
        let el = self.styled_element(id)?;
        let gutter = if el.style.overflow_y == Some(Overflow::Scroll) && self.is_attached(id) {
            self.scrollbar_width
        } else {
            0.0
        };
        Ok((self.border_box_width(id)? - gutter).max(0.0).round() as i64)
    }

    /// Width the content of `id` would take on one line without any constraint.
    pub fn natural_content_width(&self, id: NodeId) -> Result<f64> {
        let range = TextRange {
            container: id,
            start_offset: 0,
            end_offset: self.children(id).len(),
        };
        range.bounding_width(self)
    }

    /// Range over every child node of `id`; fails when there is nothing to span.
    pub fn create_range_over_children(&self, id: NodeId) -> Result<TextRange> {
        self.check_geometry(id)?;
        if self.element(id).is_none() {
            return Err(DomError::NotAnElement(id));
        }
        let len = self.children(id).len();
        if len == 0 {
            return Err(DomError::EmptyRange(id));
        }
        Ok(TextRange {
            container: id,
            start_offset: 0,
            end_offset: len,
        })
    }

    // Returns (width, participates_as_block).
    fn child_contribution(
        &self,
        child: NodeId,
        parent_font: &FontSpec,
        white_space: WhiteSpace,
    ) -> Result<(f64, bool)> {
        self.check_geometry(child)?;
        match self.kind(child)? {
            NodeKind::Text(data) => {
                let text = match white_space {
                    WhiteSpace::Pre => data.clone(),
                    WhiteSpace::Normal | WhiteSpace::Nowrap => collapse_whitespace(data),
                };
                Ok((measure_run(&text, parent_font), false))
            }
            NodeKind::Element(el) => {
                let display = self.display(child)?;
                if display == Display::None || self.is_out_of_flow(el) {
                    return Ok((0.0, false));
                }
                let (pl, pr) = el.style.horizontal_padding();
                let width = match el.style.width {
                    Some(w) => w.max(0.0) + pl + pr,
                    None => self.natural_content_width(child)? + pl + pr,
                };
                Ok((width, display == Display::Block))
            }
            NodeKind::Document => Ok((0.0, false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Style;

    fn mono(size: f64) -> Style {
        Style::default().font("monospace", size)
    }

    #[test]
    fn declared_width_plus_padding() {
        let mut doc = Document::new(500.0);
        let body = doc.body();
        let el = doc
            .append_element_with_text(body, "div", "hello", mono(20.0).width(90.0).padding_x(5.0))
            .unwrap();
        assert_eq!(doc.offset_width(el).unwrap(), 100);
        assert_eq!(doc.padding(el).unwrap(), (5.0, 5.0));
    }

    #[test]
    fn auto_block_fills_container_inline_shrinks() {
        let mut doc = Document::new(500.0);
        let body = doc.body();
        let block = doc
            .append_element_with_text(body, "div", "abc", mono(20.0))
            .unwrap();
        let inline = doc
            .append_element_with_text(body, "span", "abc", mono(20.0).padding_x(2.0))
            .unwrap();
        assert_eq!(doc.offset_width(block).unwrap(), 500);
        assert_eq!(doc.offset_width(inline).unwrap(), 34);
    }

    #[test]
    fn range_sums_text_runs_and_inline_children() {
        let mut doc = Document::new(500.0);
        let body = doc.body();
        let el = doc
            .append_element_with_text(body, "div", "ab  ", mono(20.0))
            .unwrap();
        let span = doc
            .append_element_with_text(el, "span", "cd", Style::default().padding_x(1.0))
            .unwrap();
        let range = doc.create_range_over_children(el).unwrap();
        // "ab " (collapsed) = 30, span = 20 + 2
        assert_eq!(range.bounding_width(&doc).unwrap(), 52.0);
        doc.inject_fault(span, Fault::Geometry);
        assert_eq!(
            range.bounding_width(&doc),
            Err(DomError::GeometryUnavailable(span))
        );
    }

    #[test]
    fn empty_element_has_no_range() {
        let mut doc = Document::new(500.0);
        let body = doc.body();
        let el = doc
            .append_element_with_text(body, "div", "", Style::default())
            .unwrap();
        assert_eq!(
            doc.create_range_over_children(el),
            Err(DomError::EmptyRange(el))
        );
    }

    #[test]
    fn detached_and_hidden_boxes_have_zero_width() {
        let mut doc = Document::new(500.0);
        let body = doc.body();
        let el = doc
            .append_element_with_text(body, "div", "text", Style::default().width(80.0))
            .unwrap();
        doc.detach(el).unwrap();
        assert_eq!(doc.offset_width(el).unwrap(), 0);
        doc.append_child(body, el).unwrap();
        let none = Style {
            display: Some(Display::None),
            ..Style::default().width(80.0)
        };
        doc.set_style(el, none).unwrap();
        assert_eq!(doc.offset_width(el).unwrap(), 0);
    }

    #[test]
    fn scroll_box_loses_gutter_in_client_width() {
        let mut doc = Document::new(500.0).with_scrollbar_width(17.0);
        let body = doc.body();
        let style = Style {
            overflow_y: Some(Overflow::Scroll),
            ..Style::default().width(100.0)
        };
        let el = doc.append_element_with_text(body, "div", "", style).unwrap();
        assert_eq!(doc.offset_width(el).unwrap(), 100);
        assert_eq!(doc.client_width(el).unwrap(), 83);
    }

    #[test]
    fn font_inherits_through_ancestors() {
        let mut doc = Document::new(500.0);
        let body = doc.body();
        let outer = doc
            .append_element_with_text(body, "div", "", mono(12.0))
            .unwrap();
        let inner = doc
            .append_element_with_text(
                outer,
                "span",
                "x",
                Style {
                    font_weight: Some(700),
                    ..Style::default()
                },
            )
            .unwrap();
        let font = doc.computed_font(inner).unwrap();
        assert_eq!(font.family, "monospace");
        assert_eq!(font.size_px, 12.0);
        assert_eq!(font.weight, 700);
        doc.inject_fault(inner, Fault::Style);
        assert_eq!(
            doc.computed_font(inner),
            Err(DomError::StyleUnavailable(inner))
        );
    }
}
