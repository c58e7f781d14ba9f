//! Class taxonomy: the ordered class names that give labels their meaning.
//!
//! The class-name file is a one-column CSV without header; row `n` names
//! label `n`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::error::LabelError;
use crate::item::Label;
use crate::store::CsvEncoding;

/// Display name for an item without a label.
pub const NO_CLASS: &str = "no class";

/// Digit keys can only address this many classes.
pub const KEYBOARD_CLASS_LIMIT: usize = 10;

/// Ordered, non-empty list of distinct class names. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassTaxonomy {
    names: Vec<String>,
}

impl ClassTaxonomy {
    /// Builds a taxonomy, rejecting empty lists, blank names and duplicates.
    pub fn new(names: Vec<String>) -> Result<Self, LabelError> {
        Self::from_source(names, Path::new("<memory>"))
    }

    fn from_source(names: Vec<String>, source: &Path) -> Result<Self, LabelError> {
        let invalid = |message: String| LabelError::InvalidClassNames {
            path: source.to_path_buf(),
            message,
        };

        if names.is_empty() {
            return Err(invalid("no class names".to_string()));
        }

        for (idx, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(invalid(format!("class {} has an empty name", idx)));
            }
            if let Some(first) = names[..idx].iter().position(|n| n == name) {
                return Err(invalid(format!(
                    "duplicate class name '{}' (classes {} and {})",
                    name, first, idx
                )));
            }
        }

        if names.len() > KEYBOARD_CLASS_LIMIT {
            tracing::warn!(
                "{} classes defined; only labels 0-{} can be assigned from the keyboard",
                names.len(),
                KEYBOARD_CLASS_LIMIT - 1
            );
        }

        Ok(Self { names })
    }

    /// Number of classes (always at least one).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if there are no classes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if `label` is a valid class index.
    pub fn contains(&self, label: Label) -> bool {
        label.index() < self.names.len()
    }

    /// Returns the class name for a valid label.
    pub fn name(&self, label: Label) -> Option<&str> {
        self.names.get(label.index()).map(String::as_str)
    }

    /// Maps a digit key to a label, or `None` if the digit names no class.
    pub fn label_for_digit(&self, digit: u8) -> Option<Label> {
        let label = Label::new(u32::from(digit));
        self.contains(label).then_some(label)
    }

    /// Human-readable class of an item's label, tolerating stale indices.
    pub fn describe(&self, label: Option<Label>) -> String {
        match label {
            None => NO_CLASS.to_string(),
            Some(l) => match self.name(l) {
                Some(name) => name.to_string(),
                None => format!("unknown class {}", l),
            },
        }
    }
}

/// Reads class names from a one-column CSV file.
///
/// Only the first field of each row is used.
pub fn read_class_names(path: &Path, encoding: CsvEncoding) -> Result<ClassTaxonomy, LabelError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LabelError::ClassNamesNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(LabelError::Io(err)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(encoding.decode(&bytes, path));

    let mut names = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LabelError::MalformedRecord {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            message: source.to_string(),
        })?;
        if let Some(name) = record.get(0) {
            names.push(name.to_string());
        }
    }

    ClassTaxonomy::from_source(names, path)
}

/// Writes class names one per row, replacing the file.
pub fn write_class_names(
    path: &Path,
    taxonomy: &ClassTaxonomy,
    encoding: CsvEncoding,
) -> Result<(), LabelError> {
    let write_err = |source| LabelError::LabelCsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(encoding.preamble().to_vec());
    for name in taxonomy.names() {
        writer.write_record([name]).map_err(write_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| write_err(csv::Error::from(e.into_error())))?;

    fs::write(path, bytes).map_err(LabelError::Io)
}

/// Parses a comma-separated class list typed by an operator.
///
/// Entries are trimmed; empty entries are dropped; an empty result is an error.
pub fn parse_class_list(input: &str) -> Result<Vec<String>, LabelError> {
    let names: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err(LabelError::InvalidClassNames {
            path: Path::new("<input>").to_path_buf(),
            message: "enter at least one class name".to_string(),
        });
    }

    Ok(names)
}

/// Asks the operator for class names until a list is confirmed.
///
/// Invalid lists and a "no" answer start over; EOF aborts with
/// [`LabelError::InputClosed`].
pub fn bootstrap_class_names<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<ClassTaxonomy, LabelError> {
    loop {
        writeln!(output, "Enter class names separated by commas:")?;
        let line = read_line(input)?;

        let taxonomy = match parse_class_list(&line).and_then(ClassTaxonomy::new) {
            Ok(taxonomy) => taxonomy,
            Err(err) => {
                writeln!(output, "{}", err)?;
                continue;
            }
        };

        for (idx, name) in taxonomy.names().iter().enumerate() {
            writeln!(output, "  [{}]: {}", idx, name)?;
        }
        write!(output, "Use these classes? [y/n] ")?;
        output.flush()?;

        let answer = read_line(input)?;
        if matches!(answer.trim(), "y" | "Y" | "yes") {
            return Ok(taxonomy);
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String, LabelError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(LabelError::InputClosed);
    }
    Ok(line)
}
