//! Copying and rendering artifacts into the public tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::data::{Artifact, ArtifactKind, Category};
use crate::error::PublishError;
use crate::publish::render::{persist_copy, Renderer};

/// Directory holding source notebooks, one subdirectory per category.
pub const NOTEBOOKS_DIR: &str = "notebooks";

/// Directory holding rendered output, one subdirectory per category.
pub const DOCS_DIR: &str = "docs";

/// Where artifacts land inside the public repository.
#[derive(Debug, Clone)]
pub struct PublicLayout {
    root: PathBuf,
}

impl PublicLayout {
    /// Layout rooted at the public repository's working tree.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for a category's notebooks.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(NOTEBOOKS_DIR).join(category.dir_name())
    }

    /// Directory for a category's rendered output.
    ///
    /// Each category owns its own subtree so equally named files from two
    /// categories never overwrite each other.
    pub fn category_docs_dir(&self, category: Category) -> PathBuf {
        self.root.join(DOCS_DIR).join(category.dir_name())
    }

    /// Destination of an artifact's copy.
    pub fn destination(&self, artifact: &Artifact) -> PathBuf {
        let within = artifact.path_within_category();
        match artifact.kind {
            ArtifactKind::RenderedOutput => self.category_docs_dir(artifact.category).join(within),
            ArtifactKind::Document | ArtifactKind::Unknown => {
                self.category_dir(artifact.category).join(within)
            }
        }
    }

    /// Directory a document's rendered page is written to, mirroring the
    /// document's place inside its category.
    pub fn render_dir(&self, artifact: &Artifact) -> PathBuf {
        let docs = self.category_docs_dir(artifact.category);
        match artifact.path_within_category().parent() {
            Some(parent) => docs.join(parent),
            None => docs,
        }
    }
}

/// What materialization wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Materialized {
    /// Files copied into the public tree.
    pub copied: Vec<PathBuf>,
    /// Rendered documents written.
    pub rendered: Vec<PathBuf>,
    /// Base names of documents that were copied but could not be rendered.
    pub degraded: Vec<String>,
}

/// Copies each artifact into the public tree and renders source documents.
///
/// A copy failure aborts with an error. A render failure is logged and the
/// document is recorded as degraded. `renderer` of `None` skips rendering.
pub fn materialize(
    layout: &PublicLayout,
    artifacts: &[Artifact],
    renderer: Option<&dyn Renderer>,
) -> Result<Materialized> {
    let mut result = Materialized::default();

    for artifact in artifacts {
        if artifact.kind == ArtifactKind::Unknown {
            debug!(path = %artifact.path.display(), "Skipping artifact of unknown kind");
            continue;
        }

        let destination = layout.destination(artifact);
        copy_artifact(&artifact.path, &destination)?;
        result.copied.push(destination.clone());

        if artifact.kind != ArtifactKind::Document {
            continue;
        }
        let Some(renderer) = renderer else {
            continue;
        };

        // Render from the published copy so the staging file is never touched.
        match renderer.render(&destination, &layout.render_dir(artifact)) {
            Ok(rendered) => result.rendered.push(rendered),
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(artifact = %artifact.base_name, error = %reason, "Render failed; publishing notebook without HTML");
                result.degraded.push(artifact.base_name.clone());
            }
        }
    }

    Ok(result)
}

fn copy_artifact(source: &Path, destination: &Path) -> Result<()> {
    let copy_error = |reason: String| PublishError::Copy {
        path: source.to_path_buf(),
        reason,
    };

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| copy_error(e.to_string()))?;
    }
    persist_copy(source, destination).map_err(|e| copy_error(format!("{e:#}")))?;
    Ok(())
}
