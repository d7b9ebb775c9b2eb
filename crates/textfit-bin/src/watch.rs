//! `textfit watch`: live document, debounced re-detection, JSON lines out.

use anyhow::Result;
use core_config::Config;
use core_dom::Document;
use core_events::{
    AsyncEventSource, CHANNEL_SEND_FAILURES, Event, WATCH_DROPPED, WATCH_NOTIFICATIONS, send_or_count,
};
use core_overflow::{ObserveOptions, OverflowDetector, Subscription};
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::commands::{Report, read_page};

/// Emits `Event::Shutdown` on Ctrl-C.
pub struct CtrlCSource;

impl AsyncEventSource for CtrlCSource {
    fn name(&self) -> &'static str {
        "ctrl_c"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(err) = res {
                        warn!(target: "runtime.events", ?err, "ctrl_c_listener_failed");
                        return;
                    }
                    send_or_count(&tx, Event::Shutdown).await;
                }
                _ = tx.closed() => {}
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Break,
}

pub struct WatchRuntime<W: Write> {
    page_path: PathBuf,
    doc: Document,
    detector: OverflowDetector,
    subscriptions: Vec<Subscription>,
    reports: Rc<RefCell<Vec<Report>>>,
    out: W,
}

impl<W: Write> WatchRuntime<W> {
    /// Subscribe every selector. An unresolvable selector is a startup error.
    pub fn new(
        page_path: PathBuf,
        mut doc: Document,
        mut detector: OverflowDetector,
        config: &Config,
        selectors: &[String],
        out: W,
    ) -> Result<Self> {
        let opts = ObserveOptions {
            immediate: config.file.observe.immediate,
            debounce_ms: config.effective_debounce_ms,
        };
        let reports: Rc<RefCell<Vec<Report>>> = Rc::default();
        let mut subscriptions = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let sink = Rc::clone(&reports);
            let name = selector.clone();
            let sub = detector.observe(
                &mut doc,
                selector.as_str(),
                move |result, _| {
                    sink.borrow_mut().push(Report {
                        selector: name.clone(),
                        result: result.clone(),
                    })
                },
                opts,
            )?;
            subscriptions.push(sub);
        }
        info!(
            target: "runtime",
            watches = subscriptions.len(),
            debounce_ms = opts.debounce_ms,
            immediate = opts.immediate,
            "watch_ready"
        );
        let mut runtime = Self {
            page_path,
            doc,
            detector,
            subscriptions,
            reports,
            out,
        };
        runtime.flush()?;
        Ok(runtime)
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn handle_event(&mut self, event: &Event) -> Result<LoopControl> {
        match event {
            Event::PageChanged(_) => {
                self.reload();
                self.tick()?;
                Ok(LoopControl::Continue)
            }
            Event::Tick => {
                self.tick()?;
                Ok(LoopControl::Continue)
            }
            Event::Shutdown => Ok(LoopControl::Break),
        }
    }

    pub async fn run(
        &mut self,
        mut rx: Receiver<Event>,
        tx: Sender<Event>,
        mut source_handles: Vec<JoinHandle<()>>,
    ) -> Result<()> {
        let span = tracing::debug_span!(target: "runtime", "watch_loop");
        let _enter = span.enter();
        while let Some(event) = rx.recv().await {
            trace!(target: "runtime", ?event, "event");
            if self.handle_event(&event)? == LoopControl::Break {
                break;
            }
        }
        rx.close();
        drop(tx);
        self.shutdown();
        while let Some(handle) = source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(())) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
                Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
                Err(_) => warn!(target: "runtime.shutdown", "event_source_task_timeout"),
            }
        }
        Ok(())
    }

    fn reload(&mut self) {
        let page = match read_page(&self.page_path) {
            Ok(page) => page,
            Err(err) => {
                warn!(target: "runtime", error = %format!("{err:#}"), "page_reload_failed");
                return;
            }
        };
        match self.doc.apply_page(&page) {
            Ok(changed) => debug!(target: "runtime", changed, "page_reloaded"),
            Err(err) => warn!(target: "runtime", %err, "page_apply_failed"),
        }
    }

    fn tick(&mut self) -> Result<()> {
        let fired = self.detector.poll(&mut self.doc);
        if fired > 0 {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let reports = std::mem::take(&mut *self.reports.borrow_mut());
        for report in &reports {
            writeln!(self.out, "{}", serde_json::to_string(report)?)?;
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn shutdown(&mut self) {
        for sub in self.subscriptions.drain(..) {
            self.detector.unobserve(&mut self.doc, &sub);
        }
        self.detector.cleanup(&mut self.doc);
        info!(
            target: "runtime.shutdown",
            send_failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
            page_notifications = WATCH_NOTIFICATIONS.load(Ordering::Relaxed),
            page_notifications_dropped = WATCH_DROPPED.load(Ordering::Relaxed),
            "watch_stopped"
        );
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}
