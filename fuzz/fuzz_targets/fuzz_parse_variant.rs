//! Fuzz target for variant notation and location parsing
//!
//! Feeds arbitrary strings to the notation and location parsers to find
//! panics.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if input.len() > 1000 {
            return;
        }

        let _ = ferro_effect::variant::parse_notation(input);
        let _ = ferro_effect::variant::parse_location(input);
    }
});
