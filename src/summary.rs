//! End-of-session summary printed by the `label` command.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::session::{SessionEnd, SessionOutcome};
use crate::taxonomy::ClassTaxonomy;

#[derive(Clone, Debug, Serialize)]
pub struct LabelSummary {
    /// Where the labels were written, if they were.
    pub saved_to: Option<PathBuf>,
    pub total: usize,
    pub labeled: usize,
    /// Per-class counts in label order.
    pub classes: Vec<ClassCount>,
    /// Names of items left without a label, in item order.
    pub unclassified: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub name: String,
    pub count: usize,
}

impl LabelSummary {
    pub fn new(outcome: &SessionOutcome, taxonomy: &ClassTaxonomy, save_path: &Path) -> Self {
        let mut counts = vec![0usize; taxonomy.len()];
        let mut unclassified = Vec::new();
        let mut labeled = 0;

        for record in &outcome.records {
            match record.label {
                Some(label) => {
                    labeled += 1;
                    if let Some(count) = counts.get_mut(label.index()) {
                        *count += 1;
                    }
                }
                None => unclassified.push(record.name.clone()),
            }
        }

        Self {
            saved_to: (outcome.end == SessionEnd::Saved).then(|| save_path.to_path_buf()),
            total: outcome.records.len(),
            labeled,
            classes: taxonomy
                .names()
                .iter()
                .zip(counts)
                .map(|(name, count)| ClassCount {
                    name: name.clone(),
                    count,
                })
                .collect(),
            unclassified,
        }
    }
}

impl fmt::Display for LabelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.unclassified.is_empty() {
            writeln!(f, "not classified:")?;
            for name in &self.unclassified {
                writeln!(f, "  {}", name)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "labeled {}/{} image(s)", self.labeled, self.total)?;
        for class in &self.classes {
            writeln!(f, "  {}: {}", class.name, class.count)?;
        }

        match &self.saved_to {
            Some(path) => writeln!(f, "result export to: {}", path.display()),
            None => writeln!(f, "quit without saving"),
        }
    }
}
