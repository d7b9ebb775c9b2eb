//! Core event types, clocks, debouncing and async event sources for textfit.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

pub mod clock;
pub mod debounce;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{DebounceState, Debouncer};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The watch loop uses a bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. Ticks are awaited with
// `send(..).await` so they apply backpressure; file watcher callbacks run on the watcher's own
// thread and use `try_send`, dropping a change notification when the channel is full. Dropping is
// safe there: the next reload reads the whole page again.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Telemetry counters (relaxed atomics, inspected by tests and logged at shutdown).
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static WATCH_NOTIFICATIONS: AtomicU64 = AtomicU64::new(0);
pub static WATCH_DROPPED: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the watch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The watched page description changed on disk.
    PageChanged(PathBuf),
    /// Periodic tick used to poll debounce deadlines without busy waiting.
    Tick,
    Shutdown,
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Human-readable stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task. Implementors must stop when the channel
    /// closes and should await timers or IO rather than loop.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// clone of `tx`; during shutdown the caller drops its final `Sender` before awaiting the
    /// handles so sources observe the closed channel and exit.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Emits `Event::Tick` every configured interval.
pub struct TickEventSource {
    interval: std::time::Duration,
}

impl TickEventSource {
    pub fn new(interval: std::time::Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !send_or_count(&tx, Event::Tick).await {
                    break;
                }
            }
        })
    }
}

/// Watches one file and emits `Event::PageChanged` when it is written or replaced.
///
/// The parent directory is watched (editors often replace files by rename) and
/// notifications are filtered down to the file itself.
pub struct FileWatchSource {
    path: PathBuf,
}

impl FileWatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn is_content_change(kind: &notify::EventKind) -> bool {
    matches!(
        kind,
        notify::EventKind::Modify(_) | notify::EventKind::Create(_)
    )
}

impl AsyncEventSource for FileWatchSource {
    fn name(&self) -> &'static str {
        "file_watch"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        use notify::Watcher;

        let path = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        let dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path.file_name().map(|n| n.to_os_string());
        let cb_tx = tx.clone();
        let cb_path = path.clone();

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(target: "runtime.events", ?err, "watch_error");
                    return;
                }
            };
            if !is_content_change(&event.kind) {
                return;
            }
            let ours = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if !ours {
                return;
            }
            WATCH_NOTIFICATIONS.fetch_add(1, Ordering::Relaxed);
            if cb_tx.try_send(Event::PageChanged(cb_path.clone())).is_err() {
                WATCH_DROPPED.fetch_add(1, Ordering::Relaxed);
            }
        });

        tokio::spawn(async move {
            let mut watcher = match watcher {
                Ok(w) => w,
                Err(err) => {
                    tracing::error!(target: "runtime.events", ?err, "watcher_create_failed");
                    return;
                }
            };
            if let Err(err) = watcher.watch(&dir, notify::RecursiveMode::NonRecursive) {
                tracing::error!(target: "runtime.events", ?err, dir = %dir.display(), "watch_failed");
                return;
            }
            tracing::debug!(target: "runtime.events", path = %path.display(), "watching");
            // The watcher lives exactly as long as someone listens.
            tx.closed().await;
            drop(watcher);
        })
    }
}

/// Send helper that counts failures (closed channel) instead of surfacing them.
pub async fn send_or_count(tx: &Sender<Event>, event: Event) -> bool {
    if tx.send(event).await.is_err() {
        CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
        return false;
    }
    true
}
