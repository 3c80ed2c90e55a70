//! Notebook rendering.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;

use crate::error::PublishError;

/// Converts one source document into a durable rendered document.
///
/// Implementations must not modify the source and must not leave a partial
/// file in `output_dir` on failure.
pub trait Renderer {
    /// Renders `source` into `output_dir`, returning the written path.
    fn render(&self, source: &Path, output_dir: &Path) -> Result<PathBuf>;
}

/// Renders notebooks to static HTML with `jupyter nbconvert`.
#[derive(Debug, Clone)]
pub struct NbconvertRenderer {
    program: String,
}

impl NbconvertRenderer {
    /// Creates a renderer that invokes `program nbconvert`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Renderer for NbconvertRenderer {
    fn render(&self, source: &Path, output_dir: &Path) -> Result<PathBuf> {
        let base_name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .with_context(|| format!("Source has no file name: {}", source.display()))?;
        let render_error = |reason: String| PublishError::Render {
            path: source.to_path_buf(),
            reason,
        };

        // nbconvert writes into a scratch directory; only a complete result
        // is moved into place.
        let scratch = TempDir::new().context("Failed to create render scratch directory")?;
        let output = Command::new(&self.program)
            .args(["nbconvert", "--to", "html", "--output", &base_name, "--output-dir"])
            .arg(scratch.path())
            .arg(source)
            .output()
            .map_err(|e| render_error(e.to_string()))?;

        if !output.status.success() {
            return Err(render_error(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )
            .into());
        }

        let produced = scratch.path().join(format!("{base_name}.html"));
        if !produced.is_file() {
            return Err(render_error(format!("no output written for {base_name}.html")).into());
        }

        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let destination = output_dir.join(format!("{base_name}.html"));
        persist_copy(&produced, &destination)?;

        debug!(source = %source.display(), output = %destination.display(), "Rendered notebook");
        Ok(destination)
    }
}

/// Copies `from` to `to` through a temporary file in the destination
/// directory, so `to` is either the old file or the complete new one.
pub(crate) fn persist_copy(from: &Path, to: &Path) -> Result<()> {
    let dir = to
        .parent()
        .with_context(|| format!("Destination has no parent: {}", to.display()))?;
    let temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    fs::copy(from, temp.path())
        .with_context(|| format!("Failed to copy {}", from.display()))?;
    temp.persist(to)
        .with_context(|| format!("Failed to write {}", to.display()))?;
    Ok(())
}
