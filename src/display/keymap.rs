use std::fmt::Write as _;

use crate::session::Input;
use crate::taxonomy::ClassTaxonomy;

/// Default number of items skipped by the jump keys.
pub const DEFAULT_JUMP: usize = 10;

/// Translates single characters into session inputs.
///
/// | key | input |
/// |-----|-------|
/// | `0`-`9` | assign class |
/// | `x` | clear label |
/// | `j` / `k` | next / previous |
/// | `J` / `K` | jump forward / backward |
/// | `g` / `G` | first / last |
/// | `p` | list all labels |
/// | `s` | save |
/// | `q` | save and quit |
/// | `Q` | quit without saving |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMap {
    jump: usize,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self { jump: DEFAULT_JUMP }
    }
}

impl KeyMap {
    /// Creates a key map whose jump keys move `jump` items (at least one).
    pub fn new(jump: usize) -> Self {
        Self { jump: jump.max(1) }
    }

    pub fn jump(&self) -> usize {
        self.jump
    }

    pub fn decode(&self, key: char) -> Input {
        match key {
            '0'..='9' => Input::Digit(key as u8 - b'0'),
            'x' => Input::ClearLabel,
            'j' => Input::Next,
            'k' => Input::Prev,
            'J' => Input::JumpForward(self.jump),
            'K' => Input::JumpBackward(self.jump),
            'g' => Input::First,
            'G' => Input::Last,
            'p' => Input::ListAll,
            's' => Input::Save,
            'q' => Input::SaveQuit,
            'Q' => Input::Quit,
            _ => Input::Unrecognized,
        }
    }

    /// Fuzz-only entrypoint: decodes a key script and walks a cursor over
    /// `len` items, checking it never leaves bounds.
    #[cfg(feature = "fuzzing")]
    pub fn fuzz_walk_keys(&self, script: &str, len: usize) -> usize {
        use crate::session::{step_backward, step_forward};

        let len = len.max(1);
        let mut cursor = 0;
        for key in script.chars() {
            cursor = match self.decode(key) {
                Input::Next => step_forward(cursor, 1, len),
                Input::Prev => step_backward(cursor, 1),
                Input::JumpForward(n) => step_forward(cursor, n, len),
                Input::JumpBackward(n) => step_backward(cursor, n),
                Input::First => 0,
                Input::Last => len - 1,
                _ => cursor,
            };
            assert!(cursor < len);
        }
        cursor
    }

    /// Usage banner listing the classes and keys.
    pub fn usage(&self, taxonomy: &ClassTaxonomy) -> String {
        let mut text = String::new();
        let _ = writeln!(text, "Usage ------------------------------");
        let _ = writeln!(text, "  [0] - [{}]: classify", taxonomy.len().min(10) - 1);
        for (idx, name) in taxonomy.names().iter().enumerate() {
            let _ = writeln!(text, "    [{}]: {}", idx, name);
        }
        let _ = writeln!(text, "  [x]: delete label");
        let _ = writeln!(text, "  [j]: next image");
        let _ = writeln!(text, "  [k]: previous image");
        let _ = writeln!(text, "  [J]: forward {} images", self.jump);
        let _ = writeln!(text, "  [K]: back {} images", self.jump);
        let _ = writeln!(text, "  [g]: first image");
        let _ = writeln!(text, "  [G]: last image");
        let _ = writeln!(text, "  [p]: print all labels");
        let _ = writeln!(text, "  [s]: save csv");
        let _ = writeln!(text, "  [q]: save and quit");
        let _ = writeln!(text, "  [Q]: quit without saving");
        let _ = write!(text, "------------------------------------");
        text
    }
}
