use std::path::PathBuf;
use thiserror::Error;

/// The main error type for keylabel operations.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors: fatal before any session starts.
    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("No images found in {}", dir.display())]
    NoImages { dir: PathBuf },

    #[error("Class name file not found: {}", path.display())]
    ClassNamesNotFound { path: PathBuf },

    #[error("Invalid class names in {}: {message}", path.display())]
    InvalidClassNames { path: PathBuf, message: String },

    #[error("Cannot start a labeling session with no items")]
    EmptySession,

    #[error("Malformed record in {} at line {line}: {message}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Failed to write label CSV to {}: {source}", path.display())]
    LabelCsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Label {label} of '{name}' is out of range for {class_count} class(es)")]
    LabelOutOfRange {
        name: String,
        label: u32,
        class_count: usize,
    },

    #[error("Image listed in label file does not exist: {}", path.display())]
    SplitSourceMissing { path: PathBuf },

    #[error("Label record '{name}' is not a file name inside the image directory")]
    InvalidRecordName { name: String },

    #[error("Input closed before the session ended")]
    InputClosed,

    #[error("Unsupported report format: {0}")]
    UnsupportedReportFormat(String),
}

impl LabelError {
    /// Returns true for errors raised while preparing a session, before any
    /// labeling took place.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LabelError::NotADirectory { .. }
                | LabelError::NoImages { .. }
                | LabelError::ClassNamesNotFound { .. }
                | LabelError::InvalidClassNames { .. }
                | LabelError::EmptySession
        )
    }
}
