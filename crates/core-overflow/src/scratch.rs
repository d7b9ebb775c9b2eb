//! Scoped attachment of measurement scratch nodes.

use core_dom::{Document, NodeId, Result};
use tracing::trace;

/// Class carried by every scratch node so leaks are easy to spot with a selector.
pub const SCRATCH_CLASS: &str = "textfit-scratch";

/// RAII guard: attaching a scratch node to `<body>` returns a guard that
/// detaches it again when dropped, on every exit path including early `?`
/// returns and unwinding.
pub struct ScratchGuard<'a> {
    doc: &'a mut Document,
    node: NodeId,
}

impl<'a> ScratchGuard<'a> {
    pub fn attach(doc: &'a mut Document, node: NodeId) -> Result<Self> {
        let body = doc.body();
        doc.append_child(body, node)?;
        trace!(target: "overflow.scratch", node = node.index(), "scratch_attached");
        Ok(Self { doc, node })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        let _ = self.doc.detach(self.node);
        trace!(target: "overflow.scratch", node = self.node.index(), "scratch_detached");
    }
}

/// Number of scratch nodes currently attached to `doc`.
pub fn attached_scratch_count(doc: &Document) -> usize {
    doc.query_selector_all(&format!(".{SCRATCH_CLASS}"))
        .map(|v| v.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_dom::Style;

    #[test]
    fn guard_detaches_on_drop() {
        let mut doc = Document::new(300.0);
        let node = doc.create_element("span");
        doc.add_class(node, SCRATCH_CLASS).unwrap();
        {
            let guard = ScratchGuard::attach(&mut doc, node).unwrap();
            assert!(guard.document().is_attached(node));
            assert_eq!(attached_scratch_count(guard.document()), 1);
        }
        assert!(!doc.is_attached(node));
        assert_eq!(attached_scratch_count(&doc), 0);
    }

    #[test]
    fn guard_detaches_on_early_return() {
        fn measure(doc: &mut Document, node: NodeId, fail: bool) -> Result<f64> {
            let guard = ScratchGuard::attach(doc, node)?;
            if fail {
                return Err(core_dom::DomError::GeometryUnavailable(node));
            }
            guard.document().border_box_width(node)
        }
        let mut doc = Document::new(300.0);
        let node = doc.create_element("div");
        doc.set_style(node, Style::default().width(40.0)).unwrap();
        assert!(measure(&mut doc, node, true).is_err());
        assert!(!doc.is_attached(node));
        assert_eq!(measure(&mut doc, node, false).unwrap(), 40.0);
        assert!(!doc.is_attached(node));
    }
}
