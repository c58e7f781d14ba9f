//! Labels and the items they are attached to.
//!
//! A label is an index into the [`ClassTaxonomy`](crate::taxonomy::ClassTaxonomy).
//! Items carry `Option<Label>`; `None` means the image is still unclassified.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A class label: the index of a class name in the taxonomy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub u32);

impl Label {
    /// Creates a new Label.
    #[inline]
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize` for slice lookups.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label({})", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Label {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// One image under labeling.
///
/// `image` is whatever handle the display knows how to render; the session
/// never looks inside it. Only `label` changes during a session.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelItem<I> {
    /// Unique key, usually the image file name.
    pub name: String,
    pub image: I,
    pub label: Option<Label>,
}

impl<I> LabelItem<I> {
    pub fn new(name: impl Into<String>, image: I, label: Option<Label>) -> Self {
        Self {
            name: name.into(),
            image,
            label,
        }
    }
}

/// Image handle used by the CLI: the file on disk plus its probed size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub path: PathBuf,
    pub dimensions: Option<(u32, u32)>,
}

impl ImageRef {
    /// Builds a handle for `path`, reading the dimensions from the file header.
    ///
    /// Unreadable or unrecognized headers leave `dimensions` empty; image
    /// content is never validated.
    pub fn probe(path: &Path) -> Self {
        let dimensions = match imagesize::size(path) {
            Ok(size) => Some((size.width as u32, size.height as u32)),
            Err(err) => {
                tracing::debug!("could not read size of {}: {}", path.display(), err);
                None
            }
        };

        Self {
            path: path.to_path_buf(),
            dimensions,
        }
    }
}
