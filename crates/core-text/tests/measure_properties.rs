//! Property tests for run measurement.

use core_text::{FontSpec, TextTransform, measure_run};
use proptest::prelude::*;

fn family() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("monospace"), Just("sans-serif"), Just("Georgia, serif")]
}

proptest! {
    // Concatenating two ASCII runs measures the sum of their widths.
    #[test]
    fn ascii_runs_are_additive(a in "[ -~]{0,30}", b in "[ -~]{0,30}", family in family(), size in 6u32..48) {
        let font = FontSpec::new(family, size as f64);
        let joined = format!("{a}{b}");
        let sum = measure_run(&a, &font) + measure_run(&b, &font);
        prop_assert!((measure_run(&joined, &font) - sum).abs() < 1e-6);
    }

    // Width scales linearly with font size.
    #[test]
    fn width_scales_with_size(text in "[a-zA-Z0-9 ]{1,30}", family in family(), size in 1u32..40) {
        let small = measure_run(&text, &FontSpec::new(family, size as f64));
        let double = measure_run(&text, &FontSpec::new(family, 2.0 * size as f64));
        prop_assert!((double - 2.0 * small).abs() < 1e-6);
    }

    // Letter spacing adds exactly its value once per cluster.
    #[test]
    fn letter_spacing_is_per_cluster(text in "[a-z]{1,30}", spacing in 0u32..6) {
        let plain = FontSpec::new("sans-serif", 16.0);
        let mut spaced = plain.clone();
        spaced.letter_spacing_px = spacing as f64;
        let delta = measure_run(&text, &spaced) - measure_run(&text, &plain);
        prop_assert!((delta - spacing as f64 * text.len() as f64).abs() < 1e-6);
    }

    // Monospace widths ignore case, so transforms cannot change them.
    #[test]
    fn monospace_width_is_transform_invariant(text in "[a-zA-Z ]{0,30}") {
        let mut font = FontSpec::new("monospace", 14.0);
        let base = measure_run(&text, &font);
        font.text_transform = TextTransform::Uppercase;
        prop_assert!((measure_run(&text, &font) - base).abs() < 1e-6);
    }
}
