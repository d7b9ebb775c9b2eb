//! Page descriptions: a serde model of a document used by the binary and tests.
//!
//! ```toml
//! viewport_width = 640
//! scrollbar_width = 15
//!
//! [font]
//! family = "sans-serif"
//! size_px = 16
//!
//! [[element]]
//! tag = "div"
//! id = "title"
//! class = ["label"]
//! text = "A heading that may not fit"
//! style = { width = 120, padding_left = 4, padding_right = 4, white_space = "nowrap" }
//! ```

use core_text::FontSpec;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::{DEFAULT_SCROLLBAR_WIDTH, DEFAULT_VIEWPORT_WIDTH, Document, NodeId, Style};

/// Values a page description falls back to when it leaves them unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDefaults {
    pub font: FontSpec,
    pub viewport_width: f64,
    pub scrollbar_width: f64,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageSpec {
    #[serde(default)]
    pub viewport_width: Option<f64>,
    #[serde(default)]
    pub scrollbar_width: Option<f64>,
    #[serde(default)]
    pub font: Option<PageFont>,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSpec>,
}

/// Partial font override for the document default; unset fields keep the caller's default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageFont {
    pub family: Option<String>,
    pub size_px: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ElementSpec {
    #[serde(default = "ElementSpec::default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    fn default_tag() -> String {
        "div".to_string()
    }
}

impl Document {
    /// Build a document from a page description, filling unset page values from `defaults`.
    pub fn from_page(page: &PageSpec, defaults: &PageDefaults) -> Result<Self> {
        let mut font = defaults.font.clone();
        if let Some(over) = &page.font {
            if let Some(family) = &over.family {
                font.family = family.clone();
            }
            if let Some(size) = over.size_px {
                font.size_px = size;
            }
        }
        let mut doc = Document::new(page.viewport_width.unwrap_or(defaults.viewport_width))
            .with_scrollbar_width(page.scrollbar_width.unwrap_or(defaults.scrollbar_width))
            .with_default_font(font);
        let body = doc.body();
        for spec in &page.elements {
            doc.build_element(body, spec)?;
        }
        Ok(doc)
    }

    fn build_element(&mut self, parent: NodeId, spec: &ElementSpec) -> Result<NodeId> {
        let el = self.create_element(&spec.tag);
        if let Some(id) = &spec.id {
            self.set_id(el, id)?;
        }
        for class in &spec.class {
            self.add_class(el, class)?;
        }
        self.set_style(el, spec.style.clone())?;
        if let Some(text) = &spec.text {
            if !text.is_empty() {
                let t = self.create_text(text);
                self.append_child(el, t)?;
            }
        }
        for child in &spec.children {
            self.build_element(el, child)?;
        }
        self.append_child(parent, el)?;
        Ok(el)
    }

    /// Re-sync the live document with a newer description of the same page.
    ///
    /// Elements are matched by `id`; only text and style of matched elements are
    /// updated, so unchanged elements record no mutations. Returns how many
    /// elements changed.
    pub fn apply_page(&mut self, page: &PageSpec) -> Result<usize> {
        let mut changed = 0usize;
        let mut stack: Vec<&ElementSpec> = page.elements.iter().collect();
        while let Some(spec) = stack.pop() {
            stack.extend(spec.children.iter());
            let Some(id) = &spec.id else {
                continue;
            };
            let Some(node) = self.query_selector(&format!("#{id}"))? else {
                debug!(target: "dom.page", id = id.as_str(), "apply_page_unmatched");
                continue;
            };
            let mut touched = false;
            let text = spec.text.as_deref().unwrap_or("");
            if self.own_text(node) != text {
                self.replace_own_text(node, text)?;
                touched = true;
            }
            if self.element(node).map(|el| &el.style) != Some(&spec.style) {
                self.set_style(node, spec.style.clone())?;
                touched = true;
            }
            changed += usize::from(touched);
        }
        debug!(target: "dom.page", changed, "apply_page");
        Ok(changed)
    }

    // Text from direct text-node children only; element children keep their own text.
    fn own_text(&self, node: NodeId) -> String {
        self.children(node)
            .iter()
            .filter_map(|c| match self.kind(*c) {
                Ok(crate::NodeKind::Text(t)) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    // The first direct text child takes the new data; the others are removed.
    fn replace_own_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        let texts: Vec<NodeId> = self
            .children(node)
            .iter()
            .copied()
            .filter(|c| matches!(self.kind(*c), Ok(crate::NodeKind::Text(_))))
            .collect();
        let stale = match texts.split_first() {
            Some((first, rest)) if !text.is_empty() => {
                self.set_text(*first, text)?;
                rest
            }
            Some(_) => texts.as_slice(),
            None if text.is_empty() => return Ok(()),
            None => {
                let t = self.create_text(text);
                return self.append_child(node, t);
            }
        };
        for t in stale {
            self.remove_child(node, *t)?;
        }
        Ok(())
    }
}
