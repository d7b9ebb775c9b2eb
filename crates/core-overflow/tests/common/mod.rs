#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use core_dom::{Document, NodeId, Style};
use core_events::ManualClock;
use core_overflow::OverflowDetector;
use tracing_subscriber::fmt::MakeWriter;

/// A document holding one `div#target` with `text`, plus a detector on a manual clock.
pub fn single(text: &str, style: Style) -> (Document, NodeId, OverflowDetector, ManualClock) {
    let mut doc = Document::new(800.0);
    let body = doc.body();
    let el = doc
        .append_element_with_text(body, "div", text, style)
        .unwrap();
    doc.set_id(el, "target").unwrap();
    let clock = ManualClock::new();
    let det = OverflowDetector::with_clock(Arc::new(clock.clone()));
    (doc, el, det, clock)
}

pub fn mono(size_px: f64, width: f64) -> Style {
    Style::default().font("monospace", size_px).width(width)
}

#[derive(Clone)]
pub struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    pub fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (Self { inner: buf.clone() }, buf)
    }
}

pub struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}
