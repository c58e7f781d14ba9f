//! Fuzz target for key decoding and clamped navigation.

#![no_main]

use keylabel::display::KeyMap;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (u8, u8, &str)| {
    let (jump, len, script) = data;
    let _ = KeyMap::new(usize::from(jump)).fuzz_walk_keys(script, usize::from(len));
});
