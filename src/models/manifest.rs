use serde_json::Value;

use crate::error::{AppError, Result};

/// One manifest entry: a class label and the ordered image filenames
/// belonging to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The class label, taken verbatim from the manifest key.
    pub label: String,
    /// Image filenames under `<base>/<label>/`, in manifest order.
    pub files: Vec<String>,
}

/// A parsed dataset manifest.
///
/// The on-disk format is a JSON object whose keys are label strings and whose
/// values are arrays of filename strings, e.g.
/// `{"cat": ["1.jpg", "2.jpg"], "dog": ["a.jpg"]}`. Entry order follows the
/// document's key order and file order follows the array order, so iteration
/// is deterministic across runs. Duplicate filenames under one label are kept;
/// they are distinct training instances of the same class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parses a manifest from a JSON document.
    ///
    /// `path` is only used to identify the document in error messages.
    pub fn from_json(path: &str, body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| AppError::ManifestParse {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let object = value.as_object().ok_or_else(|| AppError::ManifestParse {
            path: path.to_string(),
            reason: "expected a JSON object mapping labels to filename arrays".to_string(),
        })?;

        let mut entries = Vec::with_capacity(object.len());
        for (label, files) in object {
            let files = files.as_array().ok_or_else(|| AppError::ManifestParse {
                path: path.to_string(),
                reason: format!("value for label {:?} is not an array", label),
            })?;

            let mut names = Vec::with_capacity(files.len());
            for file in files {
                let name = file.as_str().ok_or_else(|| AppError::ManifestParse {
                    path: path.to_string(),
                    reason: format!("label {:?} contains a non-string filename", label),
                })?;
                names.push(name.to_string());
            }

            entries.push(ManifestEntry {
                label: label.clone(),
                files: names,
            });
        }

        Ok(Self { entries })
    }

    /// The entries in manifest iteration order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Total number of (label, filename) pairs across all entries.
    pub fn total_files(&self) -> usize {
        self.entries.iter().map(|e| e.files.len()).sum()
    }

    /// Iterates (label, filename) pairs in manifest order: label order first,
    /// then filename order within each label.
    pub fn iter_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .files
                .iter()
                .map(move |file| (entry.label.as_str(), file.as_str()))
        })
    }
}
