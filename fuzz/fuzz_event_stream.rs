//! Fuzz target for the resolver's event handling.
//!
//! Run with: cargo +nightly fuzz run fuzz_event_stream
//!
//! Each input byte becomes one scripted key action against a fixed keymap
//! with overlapping chords and a bound `0`. After every action the resolver
//! must still be in a consistent state.

#![no_main]

use keychord_core::script::{self, ScriptAction, ScriptKey, ScriptSource};
use keychord_core::{BindingForest, Invocations, KeySequenceResolver, ResolverOptions};
use libfuzzer_sys::fuzz_target;

const KEYMAP: &str = r#"
j = "down"
0 = "line-start"
[g]
g = "top"
j = "g-down"
[a.b]
c = "abc"
j = "abj"
"#;

const KEYS: &[char] = &['a', 'b', 'c', 'g', 'j', 'x', '0', '1', '2', '9'];

fn action(byte: u8) -> ScriptAction {
    let key = KEYS[(byte & 0x0f) as usize % KEYS.len()];
    match byte >> 4 {
        0..=7 => ScriptAction::Tap(ScriptKey::Char(key)),
        8..=9 => ScriptAction::Tap(ScriptKey::Certain(key)),
        10 | 11 => ScriptAction::Hold(ScriptKey::Char(key)),
        12 | 13 => ScriptAction::Release(ScriptKey::Char(key)),
        14 => ScriptAction::Tap(ScriptKey::Escape),
        _ => ScriptAction::Blur,
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&first, rest)) = data.split_first() else {
        return;
    };
    let options = if first & 1 == 0 {
        ResolverOptions::default()
    } else {
        ResolverOptions::no_count()
    };
    let forest = BindingForest::parse(KEYMAP).expect("fuzz keymap is valid");
    let mut resolver =
        KeySequenceResolver::new(Invocations::default(), ScriptSource::new(), forest, options);

    for &byte in rest {
        let action = action(byte);
        let before = resolver.handler().0.len();
        script::play(&mut resolver, std::slice::from_ref(&action));

        assert!(resolver.match_depth() >= 1);
        if resolver.is_idle() {
            assert!(resolver.pending_keys().is_empty());
        }
        if !options.count_prefix {
            assert_eq!(resolver.count_prefix(), 0);
        }
        if action == ScriptAction::Blur {
            assert_eq!(resolver.pending_suppressed(), 0);
        }
        if resolver.handler().0.len() > before {
            assert!(resolver.is_idle());
            assert!(resolver.handler().0.iter().all(|i| i.count >= 1));
        }
    }
});
