//! Debounce timer as an explicit state machine.
//!
//! ```text
//!            notify(now)                 poll(now >= deadline)
//!   Idle ───────────────▶ Pending ─────────────────────────────▶ Fired
//!    ▲                    │  ▲  │                                   │
//!    │     cancel()       │  └──┘ notify(now): deadline = now+window │
//!    └────────────────────┘                                         │
//!                         ▲            notify(now)                  │
//!                         └─────────────────────────────────────────┘
//! ```
//!
//! A notify while pending reschedules the single deadline; it never queues a
//! second fire. One quiescence window therefore yields at most one fire.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending { deadline_ms: u64 },
    Fired { at_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    state: DebounceState,
    reschedules: u64,
    fires: u64,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            state: DebounceState::Idle,
            reschedules: 0,
            fires: 0,
        }
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        match self.state {
            DebounceState::Pending { deadline_ms } => Some(deadline_ms),
            _ => None,
        }
    }

    /// Activity observed at `now_ms`: (re)arm the deadline.
    pub fn notify(&mut self, now_ms: u64) {
        if self.is_pending() {
            self.reschedules += 1;
        }
        self.state = DebounceState::Pending {
            deadline_ms: now_ms.saturating_add(self.window_ms),
        };
    }

    /// Returns `true` exactly once per armed deadline, on the first poll at or after it.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.state {
            DebounceState::Pending { deadline_ms } if now_ms >= deadline_ms => {
                self.state = DebounceState::Fired { at_ms: now_ms };
                self.fires += 1;
                true
            }
            _ => false,
        }
    }

    /// Clear a pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        if was_pending {
            self.state = DebounceState::Idle;
        }
        was_pending
    }

    pub fn reschedules(&self) -> u64 {
        self.reschedules
    }

    pub fn fires(&self) -> u64 {
        self.fires
    }
}
