#![no_main]

use libfuzzer_sys::fuzz_target;
use sigtree_core::Feature;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(feature) = text.parse::<Feature>() {
        // Round-trip through the canonical name.
        assert_eq!(feature.to_string().parse::<Feature>(), Ok(feature));
    }
});
