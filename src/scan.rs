//! Image discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::LabelError;

/// File extensions recognized as images (compared ASCII case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Lists the images directly inside `dir`, sorted by file name.
///
/// Subdirectories are not searched.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>, LabelError> {
    if !dir.is_dir() {
        return Err(LabelError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| {
            LabelError::Io(source.into_io_error().unwrap_or_else(|| {
                std::io::Error::other(format!("failed while traversing {}", dir.display()))
            }))
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), IMAGE_EXTENSIONS) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Returns the file name of `path` as an item name.
pub fn item_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}
