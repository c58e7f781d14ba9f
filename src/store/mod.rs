//! Label CSV reader, writer and merge.
//!
//! A label file has no header and two columns per row:
//! - the item name (an image file name)
//! - the label as a decimal index, or an empty field for "unclassified"
//!
//! ```text
//! x.jpg,0
//! y.jpg,1
//! z.jpg,
//! ```
//!
//! # Merge policy
//!
//! [`merge_scanned`] reconciles the images found on disk with a stored mapping.
//! Scanned order wins; scanned names without a record are unclassified; stored
//! names without a scanned image are reported as dangling and dropped.
//!
//! # Label range
//!
//! Reading only parses integers. Whether a label is a valid class index is
//! checked later against a taxonomy (see [`flag_out_of_range`]).

mod report;

pub use report::{MergeIssue, MergeIssueCode, MergeReport};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::num::IntErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::error::LabelError;
use crate::item::Label;
use crate::taxonomy::ClassTaxonomy;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding of a CSV file.
///
/// A leading BOM is tolerated on read under either encoding; on write
/// `Utf8Bom` prefixes one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CsvEncoding {
    #[default]
    Utf8,
    Utf8Bom,
}

impl CsvEncoding {
    /// Strips the BOM (if any) from raw file contents.
    pub(crate) fn decode<'a>(self, bytes: &'a [u8], path: &Path) -> &'a [u8] {
        match bytes.strip_prefix(UTF8_BOM) {
            Some(rest) => rest,
            None => {
                if self == CsvEncoding::Utf8Bom && !bytes.is_empty() {
                    tracing::debug!("no BOM in {}, reading as plain UTF-8", path.display());
                }
                bytes
            }
        }
    }

    pub(crate) fn preamble(self) -> &'static [u8] {
        match self {
            CsvEncoding::Utf8 => b"",
            CsvEncoding::Utf8Bom => UTF8_BOM,
        }
    }
}

/// One stored `(name, label)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelRecord {
    pub name: String,
    pub label: Option<Label>,
}

impl LabelRecord {
    pub fn new(name: impl Into<String>, label: Option<Label>) -> Self {
        Self {
            name: name.into(),
            label,
        }
    }
}

/// Ordered `name -> Option<Label>` mapping with at most one record per name.
///
/// Re-inserting a name replaces its label but keeps its original position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelMapping {
    records: Vec<LabelRecord>,
    positions: HashMap<String, usize>,
}

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record, returning the previous label if the name
    /// was already present.
    pub fn insert(&mut self, name: impl Into<String>, label: Option<Label>) -> Option<Option<Label>> {
        let name = name.into();
        if let Some(&pos) = self.positions.get(&name) {
            return Some(std::mem::replace(&mut self.records[pos].label, label));
        }

        self.positions.insert(name.clone(), self.records.len());
        self.records.push(LabelRecord { name, label });
        None
    }

    /// Looks up a name. The outer `Option` is presence, the inner one the label.
    pub fn get(&self, name: &str) -> Option<Option<Label>> {
        self.positions.get(name).map(|&pos| self.records[pos].label)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LabelRecord] {
        &self.records
    }
}

impl<S: Into<String>> FromIterator<(S, Option<Label>)> for LabelMapping {
    fn from_iter<T: IntoIterator<Item = (S, Option<Label>)>>(iter: T) -> Self {
        let mut mapping = LabelMapping::new();
        for (name, label) in iter {
            mapping.insert(name, label);
        }
        mapping
    }
}

/// Result of merging scanned names with a stored mapping.
#[derive(Clone, Debug, Default)]
pub struct MergeOutcome {
    /// One record per scanned name, in scanned order.
    pub records: Vec<LabelRecord>,
    pub report: MergeReport,
}

// ============================================================================
// Public API
// ============================================================================

/// Reads a label file.
///
/// A missing file yields an empty mapping. Any row that is not
/// `(name, integer-or-empty)` fails the whole read: a corrupt label file must
/// not be mistaken for "no prior labels".
pub fn read_label_csv(path: &Path, encoding: CsvEncoding) -> Result<LabelMapping, LabelError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("no label file at {}, starting empty", path.display());
            return Ok(LabelMapping::new());
        }
        Err(err) => return Err(LabelError::Io(err)),
    };

    parse_label_rows(encoding.decode(&bytes, path), path)
}

/// Reads a label mapping from a string.
///
/// Useful for testing without file I/O.
pub fn from_label_csv_str(csv_str: &str) -> Result<LabelMapping, LabelError> {
    from_label_csv_slice(csv_str.as_bytes(), CsvEncoding::Utf8)
}

/// Reads a label mapping from raw bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_label_csv_slice(bytes: &[u8], encoding: CsvEncoding) -> Result<LabelMapping, LabelError> {
    let dummy_path = Path::new("<bytes>");
    parse_label_rows(encoding.decode(bytes, dummy_path), dummy_path)
}

/// Writes one row per input pair, in input order, replacing the file.
///
/// The whole file is encoded in memory first, so a failure while encoding
/// leaves any existing file untouched.
pub fn write_label_csv<'a, R>(path: &Path, rows: R, encoding: CsvEncoding) -> Result<(), LabelError>
where
    R: IntoIterator<Item = (&'a str, Option<Label>)>,
{
    let bytes = encode_label_rows(rows, encoding).map_err(|source| LabelError::LabelCsvWrite {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, bytes).map_err(LabelError::Io)
}

/// Writes label rows to a string.
///
/// Useful for testing without file I/O.
pub fn to_label_csv_string<'a, R>(rows: R, encoding: CsvEncoding) -> Result<String, LabelError>
where
    R: IntoIterator<Item = (&'a str, Option<Label>)>,
{
    let bytes = encode_label_rows(rows, encoding).map_err(|source| LabelError::LabelCsvWrite {
        path: Path::new("<string>").to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|e| LabelError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Pairs every scanned name with its stored label.
///
/// Output order follows `scanned`. Stored names with no scanned counterpart
/// are logged, recorded as [`MergeIssueCode::DanglingRecord`] and left out.
pub fn merge_scanned<S: AsRef<str>>(scanned: &[S], stored: &LabelMapping) -> MergeOutcome {
    let scanned_names: HashSet<&str> = scanned.iter().map(|s| s.as_ref()).collect();

    let records = scanned
        .iter()
        .map(|name| {
            let name = name.as_ref();
            LabelRecord::new(name, stored.get(name).flatten())
        })
        .collect();

    let mut report = MergeReport::new();
    for record in stored.records() {
        if scanned_names.contains(record.name.as_str()) {
            continue;
        }
        tracing::warn!("label record '{}' has no matching image, dropping it", record.name);
        report.add(MergeIssue::new(
            MergeIssueCode::DanglingRecord,
            record.name.clone(),
            "no matching image was found",
        ));
    }

    MergeOutcome { records, report }
}

/// Adds an [`MergeIssueCode::OutOfRangeLabel`] warning for every record whose
/// label is not a class index of `taxonomy`.
///
/// Such labels are kept as-is; they just cannot be produced from the keyboard.
pub fn flag_out_of_range(records: &[LabelRecord], taxonomy: &ClassTaxonomy, report: &mut MergeReport) {
    for record in records {
        let Some(label) = record.label else {
            continue;
        };
        if taxonomy.contains(label) {
            continue;
        }
        tracing::warn!(
            "label {} of '{}' is out of range for {} class(es)",
            label,
            record.name,
            taxonomy.len()
        );
        report.add(MergeIssue::new(
            MergeIssueCode::OutOfRangeLabel,
            record.name.clone(),
            format!("label {} exceeds {} class(es)", label, taxonomy.len()),
        ));
    }
}

// ============================================================================
// CSV encoding
// ============================================================================

fn parse_label_rows(bytes: &[u8], path: &Path) -> Result<LabelMapping, LabelError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut mapping = LabelMapping::new();

    for result in reader.records() {
        let record = result.map_err(|source| LabelError::MalformedRecord {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            message: source.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < 2 {
            return Err(LabelError::MalformedRecord {
                path: path.to_path_buf(),
                line,
                message: format!("expected 2 fields (name, label), found {}", record.len()),
            });
        }

        let label = parse_label_field(&record[1]).map_err(|message| LabelError::MalformedRecord {
            path: path.to_path_buf(),
            line,
            message,
        })?;

        mapping.insert(&record[0], label);
    }

    Ok(mapping)
}

fn parse_label_field(field: &str) -> Result<Option<Label>, String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<u32>()
        .map(|index| Some(Label::new(index)))
        .map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => {
                format!("label '{}' is larger than the maximum label {}", trimmed, u32::MAX)
            }
            _ => format!("label '{}' is not a non-negative integer", trimmed),
        })
}

fn encode_label_rows<'a, R>(rows: R, encoding: CsvEncoding) -> Result<Vec<u8>, csv::Error>
where
    R: IntoIterator<Item = (&'a str, Option<Label>)>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(encoding.preamble().to_vec());

    for (name, label) in rows {
        let label_field = label.map(|l| l.to_string()).unwrap_or_default();
        writer.write_record([name, label_field.as_str()])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

// ============================================================================
// Tests
// ============================================================================
