//! Text measurement primitives.
//!
//! `measure_run` is the natural (unwrapped, single line) width oracle used by
//! the document layout for both range bounding boxes and scratch nodes, so the
//! two overflow strategies agree on identical inputs.

pub mod font;
pub mod measure;
pub mod segment;
pub mod width;

pub use font::{FontSpec, FontStyle, TextTransform};
pub use measure::{advance_em, apply_transform, measure_run};
pub use width::egc_width;
