use core_config::load_from;
use core_dom::{Document, PageDefaults, PageSpec};
use core_events::ManualClock;
use core_overflow::{ObserveOptions, OverflowDetector, ScrollbarMeter, attached_scratch_count};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

// Integration-adjacent test: a page description and a config file flow through
// the same crates the binary wires together.
const PAGE: &str = r#"
viewport_width = 480

[[element]]
id = "card"
style = { width = 200, padding_left = 8, padding_right = 8 }

[[element.children]]
tag = "span"
id = "label"
text = "Quarterly revenue summary for the northern region"
style = { white_space = "nowrap" }
"#;

fn build(config_body: &str) -> (Document, core_config::Config) {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), config_body).unwrap();
    let config = load_from(Some(tmp.path().to_path_buf())).unwrap();
    let page: PageSpec = toml::from_str(PAGE).unwrap();
    let defaults = PageDefaults {
        font: config.default_font(),
        viewport_width: config.file.layout.viewport_width,
        scrollbar_width: config.file.layout.scrollbar_width,
    };
    (Document::from_page(&page, &defaults).unwrap(), config)
}

#[test]
fn config_font_drives_measurement() {
    let (mut doc, config) = build("[font]\nfamily = \"monospace\"\nsize_px = 10\n");
    assert_eq!(doc.viewport_width(), 480.0);
    let mut det = OverflowDetector::with_clock(Arc::new(ManualClock::new()));

    // 49 cells at 5px.
    let card = det.detect(&mut doc, "#card", None);
    assert_eq!(card.error, None);
    assert_eq!(card.text_width, 245.0);
    assert_eq!(card.available_width, 200.0);
    assert!(card.is_overflowing);

    let clone = det.detect_by_clone(&mut doc, "#card", None);
    assert!(config.widths_agree(card.text_width, clone.text_width));
    assert_eq!(attached_scratch_count(&doc), 0);

    let shorter = det.detect(&mut doc, "#card", Some("Q3 summary"));
    assert!(!shorter.is_overflowing);
    assert_eq!(shorter.text_width, 50.0);
}

#[test]
fn page_reload_triggers_one_debounced_report() {
    let (mut doc, config) = build("[font]\nfamily = \"monospace\"\nsize_px = 10\n[observe]\ndebounce_ms = 40\n");
    let clock = ManualClock::new();
    let mut det = OverflowDetector::with_clock(Arc::new(clock.clone()));
    let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
    let sink = Rc::clone(&seen);
    det.observe(
        &mut doc,
        "#card",
        move |r, _| sink.borrow_mut().push(r.is_overflowing),
        ObserveOptions {
            immediate: config.file.observe.immediate,
            debounce_ms: config.effective_debounce_ms,
        },
    )
    .unwrap();
    assert_eq!(*seen.borrow(), vec![true]);

    let edited: PageSpec = toml::from_str(&PAGE.replace(
        "Quarterly revenue summary for the northern region",
        "Q3 north",
    ))
    .unwrap();
    assert_eq!(doc.apply_page(&edited).unwrap(), 1);
    det.poll(&mut doc);
    clock.advance(39);
    assert_eq!(det.poll(&mut doc), 0);
    clock.advance(1);
    assert_eq!(det.poll(&mut doc), 1);
    assert_eq!(*seen.borrow(), vec![true, false]);
}

#[test]
fn scrollbar_width_comes_from_config_layout() {
    let (mut doc, _config) = build("[layout]\nscrollbar_width = 12\n");
    let mut meter = ScrollbarMeter::new();
    assert_eq!(meter.measure(&mut doc).unwrap(), 12);
    assert_eq!(attached_scratch_count(&doc), 0);
}
