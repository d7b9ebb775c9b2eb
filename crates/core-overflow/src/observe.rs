//! Debounced re-detection on content mutations.
//!
//! Each watch owns one document observer (child list, subtree, character data)
//! and one `Debouncer`. `OverflowDetector::poll` is the delivery point: it drains
//! queued records, re-arms the debouncer for every non-empty batch, then runs
//! `detect` for each watch whose quiet window has elapsed.

use std::cell::Cell;
use std::rc::Rc;

use core_dom::{Document, MutationObserverId, MutationObserverInit, NodeId, Target};
use core_events::Debouncer;
use tracing::{debug, trace};

use crate::detector::OverflowDetector;
use crate::error::UsageError;
use crate::result::MeasurementResult;

pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Run one detection while subscribing, before any mutation.
    pub immediate: bool,
    pub debounce_ms: u64,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            immediate: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

pub type OverflowCallback = Box<dyn FnMut(&MeasurementResult, NodeId)>;

/// Handle returned by `observe`. Cancelling stops future callbacks and clears
/// any pending debounce deadline. Clones share the same cancellation flag.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

pub(crate) struct Watch {
    id: u64,
    target: NodeId,
    observer: MutationObserverId,
    debouncer: Debouncer,
    callback: OverflowCallback,
    cancelled: Rc<Cell<bool>>,
}

impl OverflowDetector {
    /// Watch `target` for text mutations and report fresh results through `callback`.
    ///
    /// Fails immediately when `target` does not resolve to an element.
    pub fn observe<F>(
        &mut self,
        doc: &mut Document,
        target: impl Into<Target>,
        callback: F,
        opts: ObserveOptions,
    ) -> Result<Subscription, UsageError>
    where
        F: FnMut(&MeasurementResult, NodeId) + 'static,
    {
        let target = target.into();
        let el = doc
            .resolve(&target)
            .map_err(|source| UsageError::UnresolvedTarget {
                target: target.to_string(),
                source,
            })?;
        let observer = doc
            .observe(el, MutationObserverInit::text_content())
            .map_err(|source| UsageError::Registration {
                target: target.to_string(),
                source,
            })?;

        self.next_subscription += 1;
        let id = self.next_subscription;
        let cancelled = Rc::new(Cell::new(false));
        let mut watch = Watch {
            id,
            target: el,
            observer,
            debouncer: Debouncer::new(opts.debounce_ms),
            callback: Box::new(callback),
            cancelled: Rc::clone(&cancelled),
        };
        debug!(
            target: "overflow.observe",
            subscription = id,
            node = el.index(),
            immediate = opts.immediate,
            debounce_ms = opts.debounce_ms,
            "observe"
        );

        if opts.immediate {
            // Hand pending page mutations to their watches before our own
            // measurement adds records that get discarded.
            let now = self.now_ms();
            self.collect_batches(doc, now);
            let result = self.detect(doc, el, None);
            (watch.callback)(&result, el);
            let _ = doc.take_records(watch.observer);
            self.discard_records(doc);
        }
        self.watches.push(watch);
        Ok(Subscription { id, cancelled })
    }

    /// Deliver pending mutation batches and fire every watch whose quiet window
    /// has elapsed. Returns the number of callbacks invoked.
    pub fn poll(&mut self, doc: &mut Document) -> usize {
        self.purge_cancelled(doc);
        let now = self.now_ms();
        self.collect_batches(doc, now);

        let mut watches = std::mem::take(&mut self.watches);
        let mut fired = 0;
        for watch in &mut watches {
            if watch.cancelled.get() || !watch.debouncer.poll(now) {
                continue;
            }
            let result = self.detect(doc, watch.target, None);
            debug!(
                target: "overflow.observe",
                subscription = watch.id,
                overflowing = result.is_overflowing,
                "fire"
            );
            (watch.callback)(&result, watch.target);
            fired += 1;
        }
        self.watches = watches;
        if fired > 0 {
            self.discard_records(doc);
        }
        fired
    }

    /// Cancel `subscription` and release its document observer now.
    pub fn unobserve(&mut self, doc: &mut Document, subscription: &Subscription) {
        subscription.cancel();
        self.purge_cancelled(doc);
    }

    /// Live watches with an armed debounce deadline.
    pub fn pending_timers(&self) -> usize {
        self.live_watches()
            .filter(|w| w.debouncer.is_pending())
            .count()
    }

    /// Earliest armed debounce deadline across live watches.
    pub fn next_deadline(&self) -> Option<u64> {
        self.live_watches()
            .filter_map(|w| w.debouncer.deadline_ms())
            .min()
    }

    pub fn watch_count(&self) -> usize {
        self.live_watches().count()
    }

    fn live_watches(&self) -> impl Iterator<Item = &Watch> {
        self.watches.iter().filter(|w| !w.cancelled.get())
    }

    /// Drain each watch's queued records; a non-empty batch (re)arms its debouncer.
    fn collect_batches(&mut self, doc: &mut Document, now: u64) {
        for watch in &mut self.watches {
            let records = doc.take_records(watch.observer);
            if !records.is_empty() {
                watch.debouncer.notify(now);
                trace!(
                    target: "overflow.observe",
                    subscription = watch.id,
                    records = records.len(),
                    deadline_ms = watch.debouncer.deadline_ms(),
                    "batch"
                );
            }
        }
    }

    // Clone measurements touch the document; those records are ours, not the page's.
    fn discard_records(&self, doc: &mut Document) {
        for watch in &self.watches {
            let _ = doc.take_records(watch.observer);
        }
    }

    fn purge_cancelled(&mut self, doc: &mut Document) {
        self.watches.retain_mut(|w| {
            if !w.cancelled.get() {
                return true;
            }
            w.debouncer.cancel();
            doc.disconnect(w.observer);
            debug!(target: "overflow.observe", subscription = w.id, "unobserve");
            false
        });
    }
}
