//! Fuzz target for configuration and keymap parsing.
//!
//! Run with: cargo +nightly fuzz run fuzz_keymap_parser
//!
//! Feeds arbitrary text to `AppConfig::parse()` and, when that accepts it,
//! builds a binding forest from the keymap. A config that validates must
//! always produce a forest.

#![no_main]

use keychord_config::AppConfig;
use keychord_core::BindingForest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = AppConfig::parse(s) {
        let forest = BindingForest::from_config(&config.keymap)
            .expect("validated keymap must build a forest");
        for (chord, command) in forest.bindings() {
            assert_eq!(forest.lookup(&chord), Some(command));
        }
    }
    let _ = BindingForest::parse(s);
});
