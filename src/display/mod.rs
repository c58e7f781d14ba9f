//! Display adapters for the labeling session.
//!
//! The session talks to its surroundings only through [`DisplayPort`]: it
//! hands over an image plus a status line, receives one decoded [`Input`] per
//! call, and prints reports. The terminal adapter in [`terminal`] is what the
//! CLI uses.

mod keymap;
pub mod terminal;

pub use keymap::{KeyMap, DEFAULT_JUMP};
pub use terminal::TerminalDisplay;

use crate::error::LabelError;
use crate::session::Input;

/// The capabilities a labeling session needs from a display.
pub trait DisplayPort {
    /// The image handle this display can render.
    type Image;

    /// Opens the display surface.
    fn open(&mut self, window_name: &str) -> Result<(), LabelError>;

    /// Shows an image together with a one-line status.
    fn render(&mut self, image: &Self::Image, status: &str) -> Result<(), LabelError>;

    /// Blocks until the operator presses a key.
    fn read_key(&mut self) -> Result<Input, LabelError>;

    /// Prints free-form text (item listings, save confirmations).
    fn report(&mut self, text: &str) -> Result<(), LabelError>;

    /// Releases the display surface. Must not fail.
    fn close(&mut self, window_name: &str);
}
