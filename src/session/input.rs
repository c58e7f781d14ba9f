/// One decoded operator input.
///
/// Display adapters translate whatever their keyboard produces into these
/// symbols; the session never sees raw key codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    /// A digit key; assigns that class if it exists.
    Digit(u8),
    Next,
    Prev,
    JumpForward(usize),
    JumpBackward(usize),
    First,
    Last,
    /// Print every item with its class.
    ListAll,
    Save,
    SaveQuit,
    /// Quit without saving.
    Quit,
    ClearLabel,
    Unrecognized,
}
