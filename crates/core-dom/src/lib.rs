//! In-memory host document.
//!
//! An arena of nodes addressed by `NodeId`, with just enough style and layout
//! to answer the geometry questions text measurement asks: border-box width,
//! horizontal padding, computed font, the bounding width of a range over an
//! element's children, and the scrollbar gutter. Layout is a deterministic
//! single-line model driven by `core_text::measure_run`.
//!
//! Nodes are never freed; a removed node keeps its id and can be re-inserted.
//! Only attached nodes (reachable from the document node) have geometry.

use std::collections::HashMap;

use core_text::FontSpec;
use tracing::trace;

pub mod error;
pub mod layout;
pub mod mutation;
pub mod page;
mod selector;
pub mod style;

pub use error::{DomError, Result};
pub use layout::TextRange;
pub use mutation::{MutationKind, MutationObserverId, MutationObserverInit, MutationRecord};
pub use page::{ElementSpec, PageDefaults, PageFont, PageSpec};
pub use style::{Display, Overflow, Position, Style, Visibility, WhiteSpace};

use mutation::ObserverSlot;
use selector::{Combinator, SelectorPart, SelectorStep, parse_selector_groups};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub style: Style,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            style: Style::default(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Query failures that can be injected per node to exercise error paths of
/// callers (a throwing `getBoundingClientRect`, a detached style object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Geometry,
    Style,
}

/// How a caller designates an element: a direct reference or a selector
/// resolved against the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    Selector(String),
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Node(id) => write!(f, "node#{}", id.0),
            Target::Selector(s) => f.write_str(s),
        }
    }
}

pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;
pub const DEFAULT_SCROLLBAR_WIDTH: f64 = 15.0;

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    viewport_width: f64,
    scrollbar_width: f64,
    default_font: FontSpec,
    faults: HashMap<NodeId, Fault>,
    observers: Vec<Option<ObserverSlot>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_WIDTH)
    }
}

impl Document {
    /// Empty document with a `<body>` element spanning `viewport_width`.
    pub fn new(viewport_width: f64) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            body: NodeId(0),
            viewport_width,
            scrollbar_width: DEFAULT_SCROLLBAR_WIDTH,
            default_font: FontSpec::default(),
            faults: HashMap::new(),
            observers: Vec::new(),
        };
        let body = doc.push_node(NodeKind::Element(Element::new("body")));
        doc.nodes[body.0].parent = Some(doc.root);
        doc.nodes[doc.root.0].children.push(body);
        doc.body = body;
        doc
    }

    pub fn with_default_font(mut self, font: FontSpec) -> Self {
        self.default_font = font;
        self
    }

    pub fn with_scrollbar_width(mut self, px: f64) -> Self {
        self.scrollbar_width = px.max(0.0);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn scrollbar_width(&self) -> f64 {
        self.scrollbar_width
    }

    pub fn default_font(&self) -> &FontSpec {
        &self.default_font
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    // ---------------------------------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Create an element with `text` as its only child and append it to `parent`.
    pub fn append_element_with_text(
        &mut self,
        parent: NodeId,
        tag: &str,
        text: &str,
        style: Style,
    ) -> Result<NodeId> {
        let el = self.create_element(tag);
        self.set_style(el, style)?;
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(el, t)?;
        }
        self.append_child(parent, el)?;
        Ok(el)
    }

    // ---------------------------------------------------------------------------------------------
    // Tree access
    // ---------------------------------------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// True when `node` is `ancestor` or lies in its subtree.
    pub fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Concatenated data of all descendant text nodes, in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(t) => out.push_str(t),
            _ => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, removing it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        if !matches!(self.kind(parent)?, NodeKind::Element(_) | NodeKind::Document) {
            return Err(DomError::NotAnElement(parent));
        }
        if self.is_inclusive_descendant(parent, child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(old) = self.parent(child) {
            self.remove_child(old, child)?;
        }
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.record(MutationKind::ChildList, parent);
        Ok(())
    }

    /// Remove `child` from `parent`. Removing a node that is not a child is a no-op.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let node = self.node_mut(parent)?;
        let before = node.children.len();
        node.children.retain(|c| *c != child);
        if node.children.len() == before {
            return Ok(());
        }
        self.node_mut(child)?.parent = None;
        self.record(MutationKind::ChildList, parent);
        Ok(())
    }

    /// Remove `node` from its parent, if any.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        match self.parent(node) {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(()),
        }
    }

    /// Text nodes get their data replaced in place (a character data mutation).
    /// Elements get all children replaced by one text node (a child list mutation),
    /// or no children at all when `text` is empty.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        match self.kind(id)? {
            NodeKind::Text(data) => {
                if data == text {
                    return Ok(());
                }
                if let NodeKind::Text(data) = &mut self.node_mut(id)?.kind {
                    *data = text.to_string();
                }
                self.record(MutationKind::CharacterData, id);
                Ok(())
            }
            NodeKind::Element(_) => {
                let old = std::mem::take(&mut self.node_mut(id)?.children);
                for child in old {
                    self.node_mut(child)?.parent = None;
                }
                if !text.is_empty() {
                    let t = self.create_text(text);
                    self.node_mut(id)?.children.push(t);
                    self.node_mut(t)?.parent = Some(id);
                }
                self.record(MutationKind::ChildList, id);
                Ok(())
            }
            NodeKind::Document => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn set_style(&mut self, id: NodeId, style: Style) -> Result<()> {
        let el = self.element_mut(id)?;
        if el.style != style {
            el.style = style;
            self.record(MutationKind::Attributes, id);
        }
        Ok(())
    }

    pub fn set_id(&mut self, id: NodeId, value: &str) -> Result<()> {
        self.element_mut(id)?.id = Some(value.to_string());
        self.record(MutationKind::Attributes, id);
        Ok(())
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        if !el.has_class(class) {
            el.classes.push(class.to_string());
            self.record(MutationKind::Attributes, id);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // Faults
    // ---------------------------------------------------------------------------------------------

    pub fn inject_fault(&mut self, id: NodeId, fault: Fault) {
        self.faults.insert(id, fault);
    }

    pub fn clear_fault(&mut self, id: NodeId) {
        self.faults.remove(&id);
    }

    pub(crate) fn fault(&self, id: NodeId) -> Option<Fault> {
        self.faults.get(&id).copied()
    }

    // ---------------------------------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------------------------------

    pub fn observe(
        &mut self,
        target: NodeId,
        init: MutationObserverInit,
    ) -> Result<MutationObserverId> {
        self.node(target)?;
        let id = MutationObserverId(self.observers.len());
        self.observers.push(Some(ObserverSlot {
            target,
            init,
            queue: Vec::new(),
        }));
        trace!(target: "dom.mutation", observer = id.0, node = target.0, "observer_registered");
        Ok(id)
    }

    /// Drain queued records for `observer`. Unknown or disconnected observers yield nothing.
    pub fn take_records(&mut self, observer: MutationObserverId) -> Vec<MutationRecord> {
        match self.observers.get_mut(observer.0) {
            Some(Some(slot)) => std::mem::take(&mut slot.queue),
            _ => Vec::new(),
        }
    }

    pub fn disconnect(&mut self, observer: MutationObserverId) {
        if let Some(slot) = self.observers.get_mut(observer.0) {
            if slot.take().is_some() {
                trace!(target: "dom.mutation", observer = observer.0, "observer_disconnected");
            }
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.iter().filter(|o| o.is_some()).count()
    }

    fn record(&mut self, kind: MutationKind, target: NodeId) {
        let record = MutationRecord { kind, target };
        let mut queued = 0usize;
        for idx in 0..self.observers.len() {
            let Some(slot) = &self.observers[idx] else {
                continue;
            };
            if !slot.init.accepts(kind) {
                continue;
            }
            let in_scope = target == slot.target
                || (slot.init.subtree && self.is_inclusive_descendant(target, slot.target));
            if in_scope {
                if let Some(slot) = self.observers[idx].as_mut() {
                    slot.queue.push(record);
                    queued += 1;
                }
            }
        }
        trace!(target: "dom.mutation", ?kind, node = target.0, queued, "mutation_recorded");
    }

    // ---------------------------------------------------------------------------------------------
    // Selectors
    // ---------------------------------------------------------------------------------------------

    /// Resolve a target to an attached element.
    pub fn resolve(&self, target: &Target) -> Result<NodeId> {
        match target {
            Target::Node(id) => {
                self.node(*id)?;
                if self.element(*id).is_none() {
                    return Err(DomError::NotAnElement(*id));
                }
                if !self.is_attached(*id) {
                    return Err(DomError::Detached(*id));
                }
                Ok(*id)
            }
            Target::Selector(selector) => self
                .query_selector(selector)?
                .ok_or_else(|| DomError::NotFound(selector.clone())),
        }
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// All attached elements matching `selector`, in document order, without duplicates.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        let mut elements = Vec::new();
        self.collect_elements(self.root, &mut elements);
        Ok(elements
            .into_iter()
            .filter(|id| groups.iter().any(|chain| self.matches_chain(*id, chain)))
            .collect())
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in self.children(id) {
            if self.element(*child).is_some() {
                out.push(*child);
                self.collect_elements(*child, out);
            }
        }
    }

    fn matches_step(&self, id: NodeId, step: &SelectorStep) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if let Some(tag) = &step.tag {
            if &el.tag != tag {
                return false;
            }
        }
        if let Some(want) = &step.id {
            if el.id.as_deref() != Some(want.as_str()) {
                return false;
            }
        }
        step.classes.iter().all(|c| el.has_class(c))
    }

    fn matches_chain(&self, id: NodeId, chain: &[SelectorPart]) -> bool {
        let Some((last, rest)) = chain.split_last() else {
            return false;
        };
        if !self.matches_step(id, &last.step) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        let mut cursor = self.parent(id);
        match last.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => cursor.is_some_and(|p| self.matches_chain(p, rest)),
            Combinator::Descendant => {
                while let Some(p) = cursor {
                    if self.matches_chain(p, rest) {
                        return true;
                    }
                    cursor = self.parent(p);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new(800.0);
        let body = doc.body();
        let list = doc.create_element("ul");
        doc.add_class(list, "menu").unwrap();
        doc.append_child(body, list).unwrap();
        let item = doc
            .append_element_with_text(list, "li", "first", Style::default())
            .unwrap();
        doc.set_id(item, "first").unwrap();
        (doc, list, item)
    }

    #[test]
    fn selectors_resolve_in_document_order() {
        let (mut doc, list, item) = sample();
        let second = doc
            .append_element_with_text(list, "li", "second", Style::default())
            .unwrap();
        assert_eq!(doc.query_selector_all("li").unwrap(), vec![item, second]);
        assert_eq!(doc.resolve(&"#first".into()).unwrap(), item);
        assert_eq!(doc.resolve(&"ul.menu > li".into()).unwrap(), item);
        assert_eq!(doc.resolve(&"body li#first".into()).unwrap(), item);
        assert_eq!(
            doc.resolve(&"#missing".into()),
            Err(DomError::NotFound("#missing".into()))
        );
    }

    #[test]
    fn detached_elements_are_not_matched() {
        let (mut doc, list, item) = sample();
        doc.remove_child(list, item).unwrap();
        assert!(!doc.is_attached(item));
        assert_eq!(doc.query_selector("#first").unwrap(), None);
        assert_eq!(
            doc.resolve(&Target::Node(item)),
            Err(DomError::Detached(item))
        );
    }

    #[test]
    fn resolve_rejects_text_nodes() {
        let (doc, _list, item) = sample();
        let text = doc.children(item)[0];
        assert_eq!(
            doc.resolve(&Target::Node(text)),
            Err(DomError::NotAnElement(text))
        );
    }

    #[test]
    fn set_text_on_element_replaces_children() {
        let (mut doc, _list, item) = sample();
        let old = doc.children(item)[0];
        doc.set_text(item, "renamed").unwrap();
        assert_eq!(doc.text_content(item), "renamed");
        assert_eq!(doc.parent(old), None);
        doc.set_text(item, "").unwrap();
        assert!(doc.children(item).is_empty());
    }

    #[test]
    fn append_rejects_cycles() {
        let (mut doc, list, item) = sample();
        assert_eq!(
            doc.append_child(item, list),
            Err(DomError::HierarchyRequest {
                parent: item,
                child: list
            })
        );
    }

    #[test]
    fn observers_receive_matching_records_only() {
        let (mut doc, list, item) = sample();
        let text = doc.children(item)[0];
        let shallow = doc
            .observe(
                list,
                MutationObserverInit {
                    child_list: true,
                    ..Default::default()
                },
            )
            .unwrap();
        let deep = doc
            .observe(list, MutationObserverInit::text_content())
            .unwrap();

        doc.set_text(text, "edited").unwrap();
        doc.set_style(item, Style::default().width(10.0)).unwrap();
        let extra = doc.create_element("li");
        doc.append_child(list, extra).unwrap();

        assert_eq!(
            doc.take_records(deep),
            vec![
                MutationRecord {
                    kind: MutationKind::CharacterData,
                    target: text
                },
                MutationRecord {
                    kind: MutationKind::ChildList,
                    target: list
                },
            ]
        );
        assert_eq!(
            doc.take_records(shallow),
            vec![MutationRecord {
                kind: MutationKind::ChildList,
                target: list
            }]
        );
        assert!(doc.take_records(deep).is_empty());

        doc.disconnect(deep);
        doc.set_text(text, "again").unwrap();
        assert!(doc.take_records(deep).is_empty());
        assert_eq!(doc.observer_count(), 1);
    }

    #[test]
    fn unchanged_text_records_nothing() {
        let (mut doc, list, item) = sample();
        let text = doc.children(item)[0];
        let obs = doc
            .observe(list, MutationObserverInit::text_content())
            .unwrap();
        doc.set_text(text, "first").unwrap();
        assert!(doc.take_records(obs).is_empty());
    }
}
