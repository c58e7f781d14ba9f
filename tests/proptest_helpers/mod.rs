#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};

use keylabel::display::DisplayPort;
use keylabel::item::Label;
use keylabel::session::Input;
use keylabel::LabelError;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Display that renders nothing and replays a fixed list of keys.
#[derive(Default)]
pub struct NullDisplay {
    pub keys: VecDeque<Input>,
    pub closed: bool,
}

impl DisplayPort for NullDisplay {
    type Image = ();

    fn open(&mut self, _window_name: &str) -> Result<(), LabelError> {
        Ok(())
    }

    fn render(&mut self, _image: &(), _status: &str) -> Result<(), LabelError> {
        Ok(())
    }

    fn read_key(&mut self) -> Result<Input, LabelError> {
        self.keys.pop_front().ok_or(LabelError::InputClosed)
    }

    fn report(&mut self, _text: &str) -> Result<(), LabelError> {
        Ok(())
    }

    fn close(&mut self, _window_name: &str) {
        self.closed = true;
    }
}

/// Navigation commands only; none of them touch labels or files.
pub fn arb_navigation() -> impl Strategy<Value = Input> {
    prop_oneof![
        Just(Input::Next),
        Just(Input::Prev),
        Just(Input::First),
        Just(Input::Last),
        (0usize..50).prop_map(Input::JumpForward),
        (0usize..50).prop_map(Input::JumpBackward),
        Just(Input::Unrecognized),
    ]
}

/// Any input that neither saves nor quits.
pub fn arb_editing() -> impl Strategy<Value = Input> {
    prop_oneof![
        3 => arb_navigation(),
        2 => (0u8..10).prop_map(Input::Digit),
        1 => Just(Input::ClearLabel),
        1 => Just(Input::ListAll),
    ]
}

pub fn arb_label() -> impl Strategy<Value = Option<Label>> {
    prop_oneof![Just(None), (0u32..1000).prop_map(|i| Some(Label::new(i)))]
}

/// Item names that may need CSV quoting but never contain line breaks.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ,\"'.-]{1,16}"
}

/// Unique names mapped to labels.
pub fn arb_mapping(max: usize) -> impl Strategy<Value = BTreeMap<String, Option<Label>>> {
    prop::collection::btree_map(arb_name(), arb_label(), 0..max)
}
