//! The interactive labeling session.
//!
//! A [`SessionController`] walks a cursor over a slice of [`LabelItem`]s and
//! applies one [`Input`] symbol per step. Every navigation command clamps at
//! both ends, so no command can move the cursor out of range.
//!
//! Digit assignment writes the label first and then advances; clearing a
//! label never moves the cursor.

mod input;

pub use input::Input;

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::display::DisplayPort;
use crate::error::LabelError;
use crate::item::LabelItem;
use crate::store::{self, CsvEncoding, LabelRecord};
use crate::taxonomy::ClassTaxonomy;

/// Where the session writes labels on save.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub save_path: PathBuf,
    pub encoding: CsvEncoding,
}

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Labels were written, then the session quit.
    Saved,
    /// The session quit without writing.
    Discarded,
}

/// Result of one transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit(SessionEnd),
}

/// Final state of a session: the items in their original order.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOutcome {
    pub end: SessionEnd,
    pub records: Vec<LabelRecord>,
}

/// Labeling state machine over borrowed items.
pub struct SessionController<'a, I> {
    items: &'a mut [LabelItem<I>],
    taxonomy: &'a ClassTaxonomy,
    config: SessionConfig,
    cursor: usize,
}

impl<'a, I> SessionController<'a, I> {
    /// Creates a controller with the cursor on the first item.
    ///
    /// # Errors
    /// Returns [`LabelError::EmptySession`] if there are no items.
    pub fn new(
        items: &'a mut [LabelItem<I>],
        taxonomy: &'a ClassTaxonomy,
        config: SessionConfig,
    ) -> Result<Self, LabelError> {
        if items.is_empty() {
            return Err(LabelError::EmptySession);
        }

        Ok(Self {
            items,
            taxonomy,
            config,
            cursor: 0,
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[LabelItem<I>] {
        self.items
    }

    /// Status line for the current item: position, name and class.
    pub fn status_text(&self) -> String {
        let item = &self.items[self.cursor];
        format!(
            "{}/{} | {} | {}",
            self.cursor + 1,
            self.items.len(),
            item.name,
            self.taxonomy.describe(item.label)
        )
    }

    /// Current `(name, label)` pairs in item order.
    pub fn records(&self) -> Vec<LabelRecord> {
        self.items
            .iter()
            .map(|item| LabelRecord::new(item.name.clone(), item.label))
            .collect()
    }

    /// Runs the session until the operator quits.
    ///
    /// The display is opened here and closed on every way out, including
    /// errors while rendering, reading input or saving.
    pub fn run<D: DisplayPort<Image = I>>(
        mut self,
        display: &mut D,
        window_name: &str,
    ) -> Result<SessionOutcome, LabelError> {
        display.open(window_name)?;
        let window = OpenWindow {
            display,
            name: window_name,
        };

        self.render_current(&mut *window.display)?;
        loop {
            let input = window.display.read_key()?;
            if let Step::Exit(end) = self.apply(input, &mut *window.display)? {
                return Ok(SessionOutcome {
                    end,
                    records: self.records(),
                });
            }
        }
    }

    /// Applies a single input symbol.
    pub fn apply<D: DisplayPort<Image = I>>(
        &mut self,
        input: Input,
        display: &mut D,
    ) -> Result<Step, LabelError> {
        match input {
            Input::Digit(digit) => {
                let Some(label) = self.taxonomy.label_for_digit(digit) else {
                    return Ok(Step::Continue);
                };
                self.items[self.cursor].label = Some(label);
                self.render_current(display)?;
                display.report(&self.describe_item(self.cursor))?;
                self.move_to(step_forward(self.cursor, 1, self.items.len()), display)?;
            }
            Input::ClearLabel => {
                self.items[self.cursor].label = None;
                self.render_current(display)?;
            }
            Input::Next => self.move_to(step_forward(self.cursor, 1, self.items.len()), display)?,
            Input::Prev => self.move_to(step_backward(self.cursor, 1), display)?,
            Input::JumpForward(n) => {
                self.move_to(step_forward(self.cursor, n, self.items.len()), display)?
            }
            Input::JumpBackward(n) => self.move_to(step_backward(self.cursor, n), display)?,
            Input::First => self.move_to(0, display)?,
            Input::Last => self.move_to(self.items.len() - 1, display)?,
            Input::ListAll => display.report(&self.listing())?,
            Input::Save => self.save(display)?,
            Input::SaveQuit => {
                self.save(display)?;
                return Ok(Step::Exit(SessionEnd::Saved));
            }
            Input::Quit => return Ok(Step::Exit(SessionEnd::Discarded)),
            Input::Unrecognized => {}
        }

        Ok(Step::Continue)
    }

    fn move_to<D: DisplayPort<Image = I>>(&mut self, cursor: usize, display: &mut D) -> Result<(), LabelError> {
        debug_assert!(cursor < self.items.len());
        self.cursor = cursor;
        self.render_current(display)
    }

    fn render_current<D: DisplayPort<Image = I>>(&self, display: &mut D) -> Result<(), LabelError> {
        display.render(&self.items[self.cursor].image, &self.status_text())
    }

    fn save<D: DisplayPort<Image = I>>(&self, display: &mut D) -> Result<(), LabelError> {
        store::write_label_csv(
            &self.config.save_path,
            self.items.iter().map(|item| (item.name.as_str(), item.label)),
            self.config.encoding,
        )?;
        tracing::info!("saved {} label(s) to {}", self.items.len(), self.config.save_path.display());
        display.report(&format!("save csv to: {}", self.config.save_path.display()))
    }

    fn describe_item(&self, index: usize) -> String {
        let item = &self.items[index];
        format!("name: {}, label: {}", item.name, self.taxonomy.describe(item.label))
    }

    fn listing(&self) -> String {
        let mut text = String::from("labels ------------------------------\n");
        for index in 0..self.items.len() {
            let _ = writeln!(text, "{}", self.describe_item(index));
        }
        text.push_str("------------------------------------");
        text
    }
}

/// Moves `n` forward, stopping at the last index of a `len`-item sequence.
pub fn step_forward(cursor: usize, n: usize, len: usize) -> usize {
    cursor.saturating_add(n).min(len.saturating_sub(1))
}

/// Moves `n` backward, stopping at 0.
pub fn step_backward(cursor: usize, n: usize) -> usize {
    cursor.saturating_sub(n)
}

/// Closes the display when dropped.
struct OpenWindow<'d, 'n, D: DisplayPort> {
    display: &'d mut D,
    name: &'n str,
}

impl<D: DisplayPort> Drop for OpenWindow<'_, '_, D> {
    fn drop(&mut self) {
        self.display.close(self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Label;
    use std::collections::VecDeque;

    /// Scripted display that records what the session shows.
    #[derive(Default)]
    struct ScriptedDisplay {
        keys: VecDeque<Input>,
        rendered: Vec<String>,
        reports: Vec<String>,
        opened: bool,
        closed: bool,
    }

    impl ScriptedDisplay {
        fn with_keys(keys: &[Input]) -> Self {
            Self {
                keys: keys.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl DisplayPort for ScriptedDisplay {
        type Image = ();

        fn open(&mut self, _window_name: &str) -> Result<(), LabelError> {
            self.opened = true;
            Ok(())
        }

        fn render(&mut self, _image: &(), status: &str) -> Result<(), LabelError> {
            self.rendered.push(status.to_string());
            Ok(())
        }

        fn read_key(&mut self) -> Result<Input, LabelError> {
            self.keys.pop_front().ok_or(LabelError::InputClosed)
        }

        fn report(&mut self, text: &str) -> Result<(), LabelError> {
            self.reports.push(text.to_string());
            Ok(())
        }

        fn close(&mut self, _window_name: &str) {
            self.closed = true;
        }
    }

    fn items(names: &[&str]) -> Vec<LabelItem<()>> {
        names.iter().map(|n| LabelItem::new(*n, (), None)).collect()
    }

    fn pets() -> ClassTaxonomy {
        ClassTaxonomy::new(vec!["cat".into(), "dog".into()]).expect("taxonomy")
    }

    fn config(dir: &tempfile::TempDir) -> SessionConfig {
        SessionConfig {
            save_path: dir.path().join("label.csv"),
            encoding: CsvEncoding::Utf8,
        }
    }

    #[test]
    fn empty_session_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items: Vec<LabelItem<()>> = Vec::new();
        let result = SessionController::new(&mut items, &taxonomy, config(&temp));
        assert!(matches!(result, Err(LabelError::EmptySession)));
    }

    #[test]
    fn digit_assigns_and_advances_clear_does_not() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b", "c"]);
        let mut display = ScriptedDisplay::default();
        let mut session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        session.apply(Input::Digit(1), &mut display).unwrap();
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.items()[0].label, Some(Label::new(1)));

        session.apply(Input::ClearLabel, &mut display).unwrap();
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.items()[1].label, None);

        assert_eq!(display.reports, vec!["name: a, label: dog"]);
        assert_eq!(display.rendered[0], "1/3 | a | dog");
        assert_eq!(display.rendered[1], "2/3 | b | no class");
    }

    #[test]
    fn digit_outside_taxonomy_is_a_noop() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b"]);
        let mut display = ScriptedDisplay::default();
        let mut session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        let step = session.apply(Input::Digit(2), &mut display).unwrap();
        assert_eq!(step, Step::Continue);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.items()[0].label, None);

        session.apply(Input::Unrecognized, &mut display).unwrap();
        assert_eq!(session.cursor(), 0);
        assert!(display.rendered.is_empty());
    }

    #[test]
    fn last_item_digit_keeps_cursor_on_last() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b"]);
        let mut display = ScriptedDisplay::default();
        let mut session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        session.apply(Input::Last, &mut display).unwrap();
        session.apply(Input::Digit(0), &mut display).unwrap();
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.items()[1].label, Some(Label::new(0)));
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b", "c", "d", "e"]);
        let mut display = ScriptedDisplay::default();
        let mut session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        session.apply(Input::Prev, &mut display).unwrap();
        assert_eq!(session.cursor(), 0);
        session.apply(Input::JumpForward(3), &mut display).unwrap();
        assert_eq!(session.cursor(), 3);
        session.apply(Input::JumpForward(3), &mut display).unwrap();
        assert_eq!(session.cursor(), 4);
        session.apply(Input::Next, &mut display).unwrap();
        session.apply(Input::Next, &mut display).unwrap();
        assert_eq!(session.cursor(), 4);
        session.apply(Input::JumpBackward(2), &mut display).unwrap();
        assert_eq!(session.cursor(), 2);
        session.apply(Input::JumpBackward(usize::MAX), &mut display).unwrap();
        assert_eq!(session.cursor(), 0);
        session.apply(Input::Last, &mut display).unwrap();
        assert_eq!(session.cursor(), 4);
        session.apply(Input::First, &mut display).unwrap();
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn step_helpers_saturate() {
        assert_eq!(step_forward(usize::MAX - 1, 5, 3), 2);
        assert_eq!(step_forward(0, 1, 1), 0);
        assert_eq!(step_backward(1, 5), 0);
    }

    #[test]
    fn list_all_reports_every_item_in_order() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b"]);
        items[1].label = Some(Label::new(0));
        let mut display = ScriptedDisplay::default();
        let mut session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        session.apply(Input::ListAll, &mut display).unwrap();

        let listing = &display.reports[0];
        let a = listing.find("name: a, label: no class").expect("a listed");
        let b = listing.find("name: b, label: cat").expect("b listed");
        assert!(a < b);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn save_writes_without_ending_the_session() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b"]);
        let mut display = ScriptedDisplay::default();
        let mut session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        session.apply(Input::Digit(1), &mut display).unwrap();
        let step = session.apply(Input::Save, &mut display).unwrap();

        assert_eq!(step, Step::Continue);
        let saved = std::fs::read_to_string(temp.path().join("label.csv")).unwrap();
        assert_eq!(saved, "a,1\nb,\n");
    }

    #[test]
    fn run_saves_on_save_quit_and_closes_display() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["x.jpg", "y.jpg", "z.jpg"]);
        let mut display =
            ScriptedDisplay::with_keys(&[Input::Digit(0), Input::Digit(1), Input::SaveQuit]);

        let session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();
        let outcome = session.run(&mut display, "test").unwrap();

        assert_eq!(outcome.end, SessionEnd::Saved);
        assert_eq!(
            outcome.records,
            vec![
                LabelRecord::new("x.jpg", Some(Label::new(0))),
                LabelRecord::new("y.jpg", Some(Label::new(1))),
                LabelRecord::new("z.jpg", None),
            ]
        );
        let saved = std::fs::read_to_string(temp.path().join("label.csv")).unwrap();
        assert_eq!(saved, "x.jpg,0\ny.jpg,1\nz.jpg,\n");
        assert!(display.opened && display.closed);
    }

    #[test]
    fn run_quit_returns_labels_without_writing() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a", "b"]);
        let mut display = ScriptedDisplay::with_keys(&[Input::Digit(1), Input::Quit]);

        let session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();
        let outcome = session.run(&mut display, "test").unwrap();

        assert_eq!(outcome.end, SessionEnd::Discarded);
        assert_eq!(outcome.records[0].label, Some(Label::new(1)));
        assert!(!temp.path().join("label.csv").exists());
        assert_eq!(items[0].label, Some(Label::new(1)));
    }

    #[test]
    fn run_closes_display_when_input_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a"]);
        let mut display = ScriptedDisplay::with_keys(&[Input::Next]);

        let session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();
        let result = session.run(&mut display, "test");

        assert!(matches!(result, Err(LabelError::InputClosed)));
        assert!(display.closed);
    }

    #[test]
    fn status_text_tolerates_out_of_range_labels() {
        let temp = tempfile::tempdir().expect("temp dir");
        let taxonomy = pets();
        let mut items = items(&["a"]);
        items[0].label = Some(Label::new(5));
        let session = SessionController::new(&mut items, &taxonomy, config(&temp)).unwrap();

        assert_eq!(session.status_text(), "1/1 | a | unknown class 5");
    }
}
