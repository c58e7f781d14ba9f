//! Line-oriented terminal display.
//!
//! Each line typed by the operator is split into characters and every
//! non-whitespace character counts as one key press, so `01q` followed by
//! Enter labels two images and quits. Images are shown as their path and
//! size.

use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use super::{DisplayPort, KeyMap};
use crate::error::LabelError;
use crate::item::ImageRef;
use crate::session::Input;
use crate::taxonomy::ClassTaxonomy;

/// Terminal implementation of [`DisplayPort`] for [`ImageRef`] images.
pub struct TerminalDisplay<R, W> {
    input: R,
    output: W,
    keymap: KeyMap,
    usage: String,
    pending: VecDeque<char>,
}

impl TerminalDisplay<StdinLock<'static>, Stdout> {
    /// Display bound to the process's stdin and stdout.
    pub fn stdio(keymap: KeyMap, taxonomy: &ClassTaxonomy) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), keymap, taxonomy)
    }
}

impl<R: BufRead, W: Write> TerminalDisplay<R, W> {
    pub fn new(input: R, output: W, keymap: KeyMap, taxonomy: &ClassTaxonomy) -> Self {
        Self {
            input,
            output,
            keymap,
            usage: keymap.usage(taxonomy),
            pending: VecDeque::new(),
        }
    }

    /// Consumes the display, returning the output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> DisplayPort for TerminalDisplay<R, W> {
    type Image = ImageRef;

    fn open(&mut self, window_name: &str) -> Result<(), LabelError> {
        writeln!(self.output, "== {} ==", window_name)?;
        writeln!(self.output, "{}", self.usage)?;
        self.output.flush()?;
        Ok(())
    }

    fn render(&mut self, image: &ImageRef, status: &str) -> Result<(), LabelError> {
        writeln!(self.output, "{}", status)?;
        match image.dimensions {
            Some((width, height)) => {
                writeln!(self.output, "  {} ({}x{})", image.path.display(), width, height)?
            }
            None => writeln!(self.output, "  {}", image.path.display())?,
        }
        self.output.flush()?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<Input, LabelError> {
        loop {
            if let Some(key) = self.pending.pop_front() {
                return Ok(self.keymap.decode(key));
            }

            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(LabelError::InputClosed);
            }
            self.pending
                .extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }

    fn report(&mut self, text: &str) -> Result<(), LabelError> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }

    fn close(&mut self, window_name: &str) {
        let _ = writeln!(self.output, "== closed {} ==", window_name);
        let _ = self.output.flush();
    }
}
