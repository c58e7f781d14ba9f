use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// What a split run copied.
#[derive(Clone, Debug, Serialize)]
pub struct SplitReport {
    pub output_dir: PathBuf,
    /// Class buckets in label order, followed by the no-class bucket.
    pub buckets: Vec<BucketCount>,
    /// Images found in the image directory that had no label record.
    pub unlisted: Vec<String>,
}

impl SplitReport {
    /// Total number of files copied.
    pub fn copied(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub name: String,
    pub count: usize,
}

impl BucketCount {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Copied {} image(s) into {}:",
            self.copied(),
            self.output_dir.display()
        )?;
        for bucket in &self.buckets {
            writeln!(f, "  {}: {}", bucket.name, bucket.count)?;
        }
        if !self.unlisted.is_empty() {
            writeln!(f, "Skipped {} image(s) without a label record", self.unlisted.len())?;
        }
        Ok(())
    }
}
