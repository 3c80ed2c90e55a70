//! Staging-area scanner and categorizer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::data::{Artifact, ArtifactKind, Category};

/// Patterns recognized as editable source documents.
pub const DOCUMENT_PATTERNS: &[&str] = &["*.ipynb"];

/// Patterns recognized as rendered output.
pub const RENDERED_PATTERNS: &[&str] = &[
    "*.html", "*.htm", "*.png", "*.jpg", "*.jpeg", "*.svg", "*.pdf",
];

/// Artifacts grouped by category, categories in enum order.
pub type Catalog = BTreeMap<Category, Vec<Artifact>>;

/// Walks a staging root and groups recognized artifacts by category.
pub struct ArtifactScanner {
    documents: GlobSet,
    rendered: GlobSet,
}

impl ArtifactScanner {
    /// Creates a scanner for the default document and rendered-output kinds.
    pub fn new() -> Result<Self> {
        Ok(Self {
            documents: build_glob_set(DOCUMENT_PATTERNS)?,
            rendered: build_glob_set(RENDERED_PATTERNS)?,
        })
    }

    /// Classifies a file by name.
    pub fn kind_of(&self, path: &Path) -> ArtifactKind {
        let Some(name) = path.file_name() else {
            return ArtifactKind::Unknown;
        };
        if self.documents.is_match(name) {
            ArtifactKind::Document
        } else if self.rendered.is_match(name) {
            ArtifactKind::RenderedOutput
        } else {
            ArtifactKind::Unknown
        }
    }

    /// Scans `root` recursively.
    ///
    /// A missing or empty root yields an empty catalog. Hidden entries are
    /// skipped. Unreadable subdirectories are logged and skipped.
    pub fn scan(&self, root: &Path) -> Result<Catalog> {
        let mut catalog = Catalog::new();

        if !root.is_dir() {
            debug!(root = %root.display(), "Staging root does not exist");
            return Ok(catalog);
        }

        let mut files = Vec::new();
        collect_files(root, &mut files)
            .with_context(|| format!("Failed to read staging root: {}", root.display()))?;
        files.sort();

        for path in files {
            let kind = self.kind_of(&path);
            if kind == ArtifactKind::Unknown {
                debug!(path = %path.display(), "Skipping unrecognized file");
                continue;
            }
            if let Some(artifact) = Artifact::new(root, &path, kind) {
                catalog.entry(artifact.category).or_default().push(artifact);
            }
        }

        debug!(
            categories = catalog.len(),
            artifacts = catalog.values().map(Vec::len).sum::<usize>(),
            "Scanned staging root"
        );
        Ok(catalog)
    }
}

fn build_glob_set(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob: Glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid artifact pattern: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build artifact matcher")
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if let Err(e) = collect_files(&path, files) {
                warn!(dir = %path.display(), error = %e, "Skipping unreadable directory");
            }
        } else if file_type.is_file() {
            files.push(path);
        }
    }

    Ok(())
}
