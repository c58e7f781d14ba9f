//! Copy labeled images into one directory per class.
//!
//! Every class gets a bucket directory named after it, plus a
//! [`NO_CLASS_DIR`] bucket for unclassified records. Buckets are deleted and
//! recreated empty on each run.
//!
//! # Record policy
//!
//! The label file drives the copy, which differs from the labeling session's
//! dangling-record warning:
//! - images in the directory without a record are skipped silently (only
//!   counted in the report)
//! - a record whose name is not a plain file name (a nested or absolute
//!   path, `.` or `..`) is an error
//! - a record whose image file does not exist is an error
//! - a label that is not a class index is an error
//!
//! All records are checked before any directory is touched.

mod report;

pub use report::{BucketCount, SplitReport};

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::LabelError;
use crate::scan::{item_name, scan_images};
use crate::store::LabelMapping;
use crate::taxonomy::ClassTaxonomy;

/// Bucket for records without a label.
pub const NO_CLASS_DIR: &str = "no_class";

/// Copies every labeled image from `image_dir` into its bucket under `output_dir`.
pub fn split_images(
    image_dir: &Path,
    taxonomy: &ClassTaxonomy,
    labels: &LabelMapping,
    output_dir: &Path,
) -> Result<SplitReport, LabelError> {
    let scanned = scan_images(image_dir)?;
    for name in taxonomy.names() {
        check_bucket_name(name)?;
    }

    // Resolve every record to (source, bucket index) up front.
    let mut plan: Vec<(PathBuf, &str, usize)> = Vec::with_capacity(labels.len());
    for record in labels.records() {
        check_record_name(&record.name)?;
        let source = image_dir.join(&record.name);
        if !source.is_file() {
            return Err(LabelError::SplitSourceMissing { path: source });
        }

        let bucket = match record.label {
            Some(label) if taxonomy.contains(label) => label.index(),
            Some(label) => {
                return Err(LabelError::LabelOutOfRange {
                    name: record.name.clone(),
                    label: label.as_u32(),
                    class_count: taxonomy.len(),
                });
            }
            None => taxonomy.len(),
        };
        plan.push((source, record.name.as_str(), bucket));
    }

    let bucket_names: Vec<&str> = taxonomy
        .names()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(NO_CLASS_DIR))
        .collect();

    fs::create_dir_all(output_dir).map_err(LabelError::Io)?;
    let bucket_dirs: Vec<PathBuf> = bucket_names
        .iter()
        .map(|name| reset_dir(&output_dir.join(name)))
        .collect::<Result<_, _>>()?;

    let mut counts = vec![0usize; bucket_dirs.len()];
    for (source, name, bucket) in plan {
        fs::copy(&source, bucket_dirs[bucket].join(name)).map_err(LabelError::Io)?;
        counts[bucket] += 1;
    }

    let listed: HashSet<String> = labels.records().iter().map(|r| r.name.clone()).collect();
    let unlisted: Vec<String> = scanned
        .iter()
        .map(|path| item_name(path))
        .filter(|name| !listed.contains(name))
        .collect();
    if !unlisted.is_empty() {
        tracing::debug!("{} image(s) have no label record and were skipped", unlisted.len());
    }

    let report = SplitReport {
        output_dir: output_dir.to_path_buf(),
        buckets: bucket_names
            .iter()
            .zip(counts)
            .map(|(name, count)| BucketCount::new(*name, count))
            .collect(),
        unlisted,
    };
    tracing::info!("copied {} image(s) into {}", report.copied(), output_dir.display());

    Ok(report)
}

/// Deletes `dir` if it exists and creates it again, empty.
fn reset_dir(dir: &Path) -> Result<PathBuf, LabelError> {
    if dir.is_dir() {
        fs::remove_dir_all(dir).map_err(LabelError::Io)?;
    }
    fs::create_dir(dir).map_err(LabelError::Io)?;
    Ok(dir.to_path_buf())
}

/// Record names are joined onto both the image and bucket directories, so
/// they must be exactly one normal path component.
fn check_record_name(name: &str) -> Result<(), LabelError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(LabelError::InvalidRecordName {
            name: name.to_string(),
        }),
    }
}

/// Class names become directory names, so they must be single path components.
fn check_bucket_name(name: &str) -> Result<(), LabelError> {
    let bad = name == "."
        || name == ".."
        || name == NO_CLASS_DIR
        || name.contains(['/', '\\']);
    if bad {
        return Err(LabelError::InvalidClassNames {
            path: PathBuf::from("<split>"),
            message: format!("'{}' cannot be used as a directory name", name),
        });
    }
    Ok(())
}
