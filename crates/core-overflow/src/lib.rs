//! Text overflow detection over a `core_dom::Document`.
//!
//! `OverflowDetector` answers "is this element's text wider than its content
//! box?" with two measurement strategies, re-answers it on content mutations
//! through debounced observation, and owns the scratch node the clone strategy
//! measures with. `ScrollbarMeter` reuses the same scratch machinery to probe
//! the platform scrollbar gutter.

pub mod detector;
pub mod error;
pub mod observe;
pub mod result;
pub mod scratch;
pub mod scrollbar;

pub use detector::OverflowDetector;
pub use error::UsageError;
pub use observe::{DEFAULT_DEBOUNCE_MS, ObserveOptions, OverflowCallback, Subscription};
pub use result::{MeasurementResult, Strategy};
pub use scratch::{SCRATCH_CLASS, ScratchGuard, attached_scratch_count};
pub use scrollbar::ScrollbarMeter;
