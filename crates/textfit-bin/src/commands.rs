//! One-shot subcommands and the JSON shapes they print.

use anyhow::{Context, Result};
use core_config::Config;
use core_dom::{Document, PageDefaults, PageSpec};
use core_overflow::{MeasurementResult, OverflowDetector, ScrollbarMeter, Strategy};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::cli::StrategyArg;

/// One measured selector, flattened into a single JSON object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub selector: String,
    #[serde(flatten)]
    pub result: MeasurementResult,
}

/// Both strategies side by side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub selector: String,
    pub range: MeasurementResult,
    pub clone: MeasurementResult,
    pub agree: bool,
}

pub fn read_page(path: &Path) -> Result<PageSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading page {}", path.display()))?;
    let page = toml::from_str::<PageSpec>(&content)
        .with_context(|| format!("parsing page {}", path.display()))?;
    debug!(
        target: "runtime",
        path = %path.display(),
        size_bytes = content.len(),
        elements = page.elements.len(),
        "page_read_ok"
    );
    Ok(page)
}

pub fn page_defaults(config: &Config) -> PageDefaults {
    PageDefaults {
        font: config.default_font(),
        viewport_width: config.file.layout.viewport_width,
        scrollbar_width: config.file.layout.scrollbar_width,
    }
}

pub fn load_document(path: &Path, config: &Config) -> Result<Document> {
    let page = read_page(path)?;
    Ok(Document::from_page(&page, &page_defaults(config))?)
}

/// Measure every selector and render one JSON line per selector, in input order.
pub fn check(
    doc: &mut Document,
    detector: &mut OverflowDetector,
    config: &Config,
    selectors: &[String],
    text: Option<&str>,
    strategy: StrategyArg,
) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let line = match strategy {
            StrategyArg::Compare => {
                let range = detector.detect_by_range(doc, selector.as_str());
                let clone = detector.detect_by_clone(doc, selector.as_str(), text);
                let agree = range.is_error() == clone.is_error()
                    && config.widths_agree(range.text_width, clone.text_width);
                serde_json::to_string(&Comparison {
                    selector: selector.clone(),
                    range,
                    clone,
                    agree,
                })?
            }
            other => {
                let result = match other {
                    StrategyArg::Range => {
                        detector.detect_with(Strategy::Range, doc, selector.as_str(), text)
                    }
                    StrategyArg::Clone => {
                        detector.detect_with(Strategy::Clone, doc, selector.as_str(), text)
                    }
                    _ => detector.detect(doc, selector.as_str(), text),
                };
                serde_json::to_string(&Report {
                    selector: selector.clone(),
                    result,
                })?
            }
        };
        lines.push(line);
    }
    detector.cleanup(doc);
    info!(target: "runtime", selectors = selectors.len(), "check_complete");
    Ok(lines)
}

pub fn scrollbar(doc: &mut Document) -> Result<i64> {
    let mut meter = ScrollbarMeter::new();
    Ok(meter.measure(doc)?)
}
