//! Publishable artifact discovered under the staging root.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::Category;

/// Kind of file an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Editable source document (a notebook).
    Document,
    /// Durable rendered output such as a static page or image.
    RenderedOutput,
    /// Anything else.
    Unknown,
}

/// A file under the staging root, classified by category and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Absolute (or caller-rooted) path to the file.
    pub path: PathBuf,
    /// Path relative to the staging root.
    pub relative_path: PathBuf,
    /// Category derived from the first segment of `relative_path`.
    pub category: Category,
    /// File kind.
    pub kind: ArtifactKind,
    /// File name with the extension stripped.
    pub base_name: String,
}

impl Artifact {
    /// Builds an artifact for `path` located under `staging_root`.
    ///
    /// Returns `None` when `path` is not below `staging_root`.
    pub fn new(staging_root: &Path, path: &Path, kind: ArtifactKind) -> Option<Self> {
        let relative_path = path.strip_prefix(staging_root).ok()?.to_path_buf();
        let first_segment = relative_path
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str());
        // A file directly under the root has no directory segment.
        let segment = if relative_path.components().count() > 1 {
            first_segment
        } else {
            None
        };
        let category = Category::classify_segment(segment);
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Some(Self {
            path: path.to_path_buf(),
            relative_path,
            category,
            kind,
            base_name,
        })
    }

    /// Path below the category directory.
    ///
    /// For artifacts that sit in their category's directory this strips that
    /// directory; defaulted artifacts keep their full relative path.
    pub fn path_within_category(&self) -> PathBuf {
        self.relative_path
            .strip_prefix(self.category.dir_name())
            .map_or_else(|_| self.relative_path.clone(), Path::to_path_buf)
    }
}
