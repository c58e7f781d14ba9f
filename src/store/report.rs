//! Merge report types.
//!
//! Merging a scanned directory with a stored label file never fails; anything
//! surprising about the stored data is collected here as a warning.

use std::fmt;

use serde::Serialize;

/// Warnings produced while preparing the working set of items.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MergeReport {
    /// All issues found, in discovery order.
    pub issues: Vec<MergeIssue>,
}

impl MergeReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: MergeIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of issues with the given code.
    pub fn count(&self, code: MergeIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// Returns the names of stored records that matched no scanned image.
    pub fn dangling_names(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.code == MergeIssueCode::DanglingRecord)
            .map(|i| i.name.as_str())
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Merge completed: no issues found");
        }

        writeln!(f, "Merge completed with {} warning(s):", self.issues.len())?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single merge warning.
#[derive(Clone, Debug, Serialize)]
pub struct MergeIssue {
    /// A stable code for the issue type.
    pub code: MergeIssueCode,

    /// The item name the issue is about.
    pub name: String,

    /// A human-readable description of the issue.
    pub message: String,
}

impl MergeIssue {
    pub fn new(code: MergeIssueCode, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for MergeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[WARN ] {:?} for '{}': {}", self.code, self.name, self.message)
    }
}

/// A stable code identifying the type of merge issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MergeIssueCode {
    /// A stored record names an image that was not found by the scan.
    DanglingRecord,
    /// A stored label is not a valid index into the class taxonomy.
    OutOfRangeLabel,
}
