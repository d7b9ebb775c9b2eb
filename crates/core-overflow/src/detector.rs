//! Text overflow detection.
//!
//! Two measurements decide whether an element's rendered text is wider than
//! the room its content box leaves for it:
//!
//! * `Strategy::Range` reads the bounding width of a range over the element's
//!   live child nodes. Cheap, but it can only measure what is rendered.
//! * `Strategy::Clone` copies the element's font properties onto an invisible,
//!   absolutely positioned, non-wrapping scratch node, sets the text (the
//!   element's own or an override) and reads its natural width while attached.
//!
//! Dispatch (`detect`): an override text always goes to Clone. Otherwise Range
//! runs first and Clone is only tried when Range reports an error. Clone
//! errors do not fall back to Range.
//!
//! Measurement failures never escape as `Err`: they come back as a result with
//! `error` set and `is_overflowing == false`.

use std::sync::Arc;

use core_dom::{Document, DomError, NodeId, Position, Style, Target, Visibility, WhiteSpace};
use core_events::{Clock, SystemClock};
use tracing::debug;

use crate::observe::Watch;
use crate::result::{MeasurementResult, Strategy};
use crate::scratch::{SCRATCH_CLASS, ScratchGuard};

pub struct OverflowDetector {
    pub(crate) clock: Arc<dyn Clock>,
    /// Lazily created scratch node. Detached between calls.
    scratch: Option<NodeId>,
    pub(crate) watches: Vec<Watch>,
    pub(crate) next_subscription: u64,
}

impl Default for OverflowDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OverflowDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverflowDetector")
            .field("scratch", &self.scratch)
            .field("watches", &self.watches.len())
            .finish()
    }
}

impl OverflowDetector {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            scratch: None,
            watches: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The scratch node, if one has been created and not discarded by `cleanup`.
    pub fn scratch_node(&self) -> Option<NodeId> {
        self.scratch
    }

    /// Measure with the range strategy.
    pub fn detect_by_range(
        &mut self,
        doc: &Document,
        target: impl Into<Target>,
    ) -> MeasurementResult {
        let target = target.into();
        let now = self.now_ms();
        let outcome = measure_range(doc, &target).map(|(text, container, padding)| {
            MeasurementResult::measured(Strategy::Range, text, container, padding, false, now)
        });
        finish(Strategy::Range, &target, outcome, now)
    }

    /// Measure with the clone strategy, optionally against `text` instead of the
    /// element's own content. The target's content is never modified.
    pub fn detect_by_clone(
        &mut self,
        doc: &mut Document,
        target: impl Into<Target>,
        text: Option<&str>,
    ) -> MeasurementResult {
        let target = target.into();
        let now = self.now_ms();
        let outcome = self.measure_clone(doc, &target, text).map(|(w, container, padding)| {
            // Override text keeps sub-pixel precision; live text is reported in whole pixels.
            MeasurementResult::measured(
                Strategy::Clone,
                w,
                container,
                padding,
                text.is_some(),
                now,
            )
        });
        finish(Strategy::Clone, &target, outcome, now)
    }

    /// Measure with the preferred strategy, falling back from Range to Clone on error.
    pub fn detect(
        &mut self,
        doc: &mut Document,
        target: impl Into<Target>,
        text: Option<&str>,
    ) -> MeasurementResult {
        let target = target.into();
        if text.is_some() {
            return self.detect_by_clone(doc, target, text);
        }
        let by_range = self.detect_by_range(doc, target.clone());
        if by_range.error.is_none() {
            return by_range;
        }
        debug!(
            target: "overflow.detect",
            selector = %target,
            error = by_range.error.as_deref(),
            "range_failed_fallback_clone"
        );
        self.detect_by_clone(doc, target, None)
    }

    /// Run one explicit strategy. Range cannot measure an override text.
    pub fn detect_with(
        &mut self,
        strategy: Strategy,
        doc: &mut Document,
        target: impl Into<Target>,
        text: Option<&str>,
    ) -> MeasurementResult {
        match (strategy, text) {
            (Strategy::Range, Some(_)) => MeasurementResult::failure(
                Strategy::Range,
                "range strategy measures live content only; use clone for override text",
                self.now_ms(),
            ),
            (Strategy::Range, None) => self.detect_by_range(doc, target),
            (Strategy::Clone, text) => self.detect_by_clone(doc, target, text),
        }
    }

    /// `detect` each target independently, preserving input order.
    pub fn detect_multiple<I, T>(&mut self, doc: &mut Document, targets: I) -> Vec<MeasurementResult>
    where
        I: IntoIterator<Item = T>,
        T: Into<Target>,
    {
        targets
            .into_iter()
            .map(|t| self.detect(doc, t, None))
            .collect()
    }

    /// Detach and discard the scratch node. Safe to call any number of times.
    pub fn cleanup(&mut self, doc: &mut Document) {
        if let Some(node) = self.scratch.take() {
            let _ = doc.detach(node);
            debug!(target: "overflow.scratch", node = node.index(), "scratch_discarded");
        }
    }

    fn ensure_scratch(&mut self, doc: &mut Document) -> Result<NodeId, DomError> {
        if let Some(node) = self.scratch {
            return Ok(node);
        }
        let node = doc.create_element("span");
        doc.add_class(node, SCRATCH_CLASS)?;
        self.scratch = Some(node);
        Ok(node)
    }

    fn measure_clone(
        &mut self,
        doc: &mut Document,
        target: &Target,
        text: Option<&str>,
    ) -> Result<(f64, f64, (f64, f64)), String> {
        let el = doc.resolve(target).map_err(|e| e.to_string())?;
        let content = match text {
            Some(t) => t.to_string(),
            None => doc.text_content(el),
        };
        if content.trim().is_empty() {
            return Err("no text content to measure".to_string());
        }
        let font = doc.computed_font(el).map_err(|e| e.to_string())?;
        let padding = doc.padding(el).map_err(|e| e.to_string())?;
        let container = doc.offset_width(el).map_err(|e| e.to_string())? as f64;

        let scratch = self.ensure_scratch(doc).map_err(|e| e.to_string())?;
        let mut style = Style {
            position: Some(Position::Absolute),
            visibility: Some(Visibility::Hidden),
            white_space: Some(WhiteSpace::Nowrap),
            ..Style::default()
        };
        style.copy_font_from(&font);
        doc.set_style(scratch, style).map_err(|e| e.to_string())?;
        doc.set_text(scratch, &content).map_err(|e| e.to_string())?;

        let width = {
            let guard = ScratchGuard::attach(doc, scratch).map_err(|e| e.to_string())?;
            guard
                .document()
                .border_box_width(guard.node())
                .map_err(|e| e.to_string())?
        };
        debug!(
            target: "overflow.detect",
            strategy = "clone",
            text_len = content.len(),
            override_text = text.is_some(),
            width,
            "scratch_measured"
        );
        Ok((width, container, padding))
    }
}

fn measure_range(doc: &Document, target: &Target) -> Result<(f64, f64, (f64, f64)), String> {
    let el = doc.resolve(target).map_err(|e| e.to_string())?;
    let range = doc
        .create_range_over_children(el)
        .map_err(|e| e.to_string())?;
    let text = range.bounding_width(doc).map_err(|e| e.to_string())?;
    let padding = doc.padding(el).map_err(|e| e.to_string())?;
    let container = doc.offset_width(el).map_err(|e| e.to_string())? as f64;
    Ok((text, container, padding))
}

fn finish(
    strategy: Strategy,
    target: &Target,
    outcome: Result<MeasurementResult, String>,
    now: u64,
) -> MeasurementResult {
    match outcome {
        Ok(result) => {
            debug!(
                target: "overflow.detect",
                strategy = strategy.as_str(),
                selector = %target,
                text_width = result.text_width,
                available_width = result.available_width,
                overflowing = result.is_overflowing,
                "measured"
            );
            result
        }
        Err(error) => {
            debug!(
                target: "overflow.detect",
                strategy = strategy.as_str(),
                selector = %target,
                error = error.as_str(),
                "measure_failed"
            );
            MeasurementResult::failure(strategy, error, now)
        }
    }
}
