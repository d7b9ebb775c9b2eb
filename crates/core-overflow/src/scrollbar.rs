//! Platform scrollbar width.

use core_dom::{Document, Overflow, Position, Result, Style, Visibility};
use tracing::debug;

use crate::scratch::{SCRATCH_CLASS, ScratchGuard};

const PROBE_WIDTH_PX: f64 = 100.0;

/// Measures the vertical scrollbar gutter once per instance: a hidden, fixed
/// width box with `overflow-y: scroll` is attached, and the difference between
/// its offset and client widths is the scrollbar.
#[derive(Debug, Default)]
pub struct ScrollbarMeter {
    cached: Option<i64>,
}

impl ScrollbarMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<i64> {
        self.cached
    }

    pub fn measure(&mut self, doc: &mut Document) -> Result<i64> {
        if let Some(px) = self.cached {
            return Ok(px);
        }
        let probe = doc.create_element("div");
        doc.add_class(probe, SCRATCH_CLASS)?;
        doc.set_style(
            probe,
            Style {
                width: Some(PROBE_WIDTH_PX),
                position: Some(Position::Absolute),
                visibility: Some(Visibility::Hidden),
                overflow_y: Some(Overflow::Scroll),
                ..Style::default()
            },
        )?;
        let px = {
            let guard = ScratchGuard::attach(doc, probe)?;
            let doc = guard.document();
            doc.offset_width(probe)? - doc.client_width(probe)?
        };
        debug!(target: "overflow.scratch", scrollbar_px = px, "scrollbar_measured");
        self.cached = Some(px);
        Ok(px)
    }

    /// Forget the cached width so the next `measure` probes again.
    pub fn reset(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratch::attached_scratch_count;

    #[test]
    fn measures_platform_gutter_and_caches() {
        let mut doc = Document::new(800.0).with_scrollbar_width(17.0);
        let mut meter = ScrollbarMeter::new();
        assert_eq!(meter.measure(&mut doc).unwrap(), 17);
        assert_eq!(meter.cached(), Some(17));
        assert_eq!(attached_scratch_count(&doc), 0);

        // Cached: a different document is not probed.
        let mut other = Document::new(800.0).with_scrollbar_width(0.0);
        assert_eq!(meter.measure(&mut other).unwrap(), 17);
        meter.reset();
        assert_eq!(meter.measure(&mut other).unwrap(), 0);
    }

    #[test]
    fn instances_are_isolated() {
        let mut doc = Document::new(800.0);
        let mut a = ScrollbarMeter::new();
        let b = ScrollbarMeter::new();
        a.measure(&mut doc).unwrap();
        assert!(a.cached().is_some());
        assert!(b.cached().is_none());
    }

    #[test]
    fn every_probe_is_detached() {
        let mut doc = Document::new(800.0);
        let body = doc.body();
        let before = doc.children(body).len();
        let mut meter = ScrollbarMeter::new();
        for _ in 0..3 {
            meter.reset();
            assert_eq!(meter.measure(&mut doc).unwrap(), 15);
        }
        assert_eq!(doc.children(body).len(), before);
    }
}
