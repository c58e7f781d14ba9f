//! Building the working set of items for a session.

use std::path::Path;

use crate::error::LabelError;
use crate::item::{ImageRef, LabelItem};
use crate::scan::{item_name, scan_images};
use crate::store::{self, CsvEncoding, MergeReport};
use crate::taxonomy::ClassTaxonomy;

/// Items ready for labeling, plus the warnings raised while building them.
#[derive(Debug)]
pub struct PreparedItems {
    pub items: Vec<LabelItem<ImageRef>>,
    pub report: MergeReport,
}

/// Scans `image_dir`, reads prior labels from `labels_path` and merges them.
///
/// # Errors
/// - [`LabelError::NotADirectory`] / [`LabelError::NoImages`] if there is nothing to label
/// - [`LabelError::MalformedRecord`] if the prior label file is corrupt
pub fn prepare_items(
    image_dir: &Path,
    labels_path: &Path,
    taxonomy: &ClassTaxonomy,
    encoding: CsvEncoding,
) -> Result<PreparedItems, LabelError> {
    let paths = scan_images(image_dir)?;
    if paths.is_empty() {
        return Err(LabelError::NoImages {
            dir: image_dir.to_path_buf(),
        });
    }
    tracing::info!("found {} image(s) in {}", paths.len(), image_dir.display());

    let stored = store::read_label_csv(labels_path, encoding)?;
    let names: Vec<String> = paths.iter().map(|p| item_name(p)).collect();
    let mut merged = store::merge_scanned(&names, &stored);
    store::flag_out_of_range(&merged.records, taxonomy, &mut merged.report);

    let items = merged
        .records
        .into_iter()
        .zip(&paths)
        .map(|(record, path)| LabelItem::new(record.name, ImageRef::probe(path), record.label))
        .collect();

    Ok(PreparedItems {
        items,
        report: merged.report,
    })
}
