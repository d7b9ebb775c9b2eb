use serde::Serialize;

/// Which measurement produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Bounding box of a range over the element's live child nodes.
    Range,
    /// Natural width of an invisible single-line scratch copy of the text.
    Clone,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Range => "range",
            Strategy::Clone => "clone",
        }
    }
}

/// Outcome of one measurement. Produced fresh per call, never cached.
///
/// Invariants: `overflow_amount >= 0`; `overflow_amount > 0` implies
/// `is_overflowing`, though a sub-pixel overflow may report an amount of 0;
/// a populated `error` implies `!is_overflowing` and zero widths.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    pub is_overflowing: bool,
    pub error: Option<String>,
    pub text_width: f64,
    pub container_width: f64,
    pub available_width: f64,
    pub overflow_amount: f64,
    pub timestamp_ms: u64,
    pub strategy: Strategy,
}

impl MeasurementResult {
    pub(crate) fn failure(strategy: Strategy, error: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            is_overflowing: false,
            error: Some(error.into()),
            text_width: 0.0,
            container_width: 0.0,
            available_width: 0.0,
            overflow_amount: 0.0,
            timestamp_ms,
            strategy,
        }
    }

    /// Compare a measured text width against the container's content box.
    ///
    /// The strict `text > available` comparison uses the measured values.
    /// `precise` keeps sub-pixel widths in the report; otherwise the reported
    /// widths are rounded to whole pixels.
    pub(crate) fn measured(
        strategy: Strategy,
        text_width: f64,
        container_width: f64,
        padding: (f64, f64),
        precise: bool,
        timestamp_ms: u64,
    ) -> Self {
        let px = |v: f64| if precise { v } else { v.round() };
        let available = container_width - padding.0 - padding.1;
        Self {
            is_overflowing: text_width > available,
            error: None,
            text_width: px(text_width),
            container_width,
            available_width: px(available),
            overflow_amount: px((text_width - available).max(0.0)),
            timestamp_ms,
            strategy,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
