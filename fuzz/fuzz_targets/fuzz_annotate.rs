//! Fuzz target for end-to-end annotation
//!
//! Splits the input into a location and a notation and annotates it against
//! the synthetic test genome. Malformed input must come back as an error,
//! never a panic.

#![no_main]

use ferro_effect::{MockProvider, VariantAnnotator, VariantInput};
use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

static PROVIDER: Lazy<MockProvider> = Lazy::new(MockProvider::with_test_data);

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if input.len() > 200 {
        return;
    }
    let Some((loc, var)) = input.split_once(' ') else {
        return;
    };

    let annotator = VariantAnnotator::new(&*PROVIDER, &*PROVIDER);
    let _ = annotator.annotate_variant(&VariantInput::new().loc(loc).var(var));
});
