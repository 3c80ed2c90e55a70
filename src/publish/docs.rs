//! Documentation index regeneration.
//!
//! The built-in generator writes one README per category folder and a
//! project-wide `NOTEBOOKS_README.md` linking the notebooks and their
//! rendered HTML. Output depends only on repository content, so running it
//! repeatedly over an unchanged tree produces identical files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::Category;
use crate::publish::materialize::{PublicLayout, DOCS_DIR, NOTEBOOKS_DIR};

/// Name of the project-wide overview file.
pub const OVERVIEW_FILE: &str = "NOTEBOOKS_README.md";

const DESCRIPTION_LIMIT: usize = 100;

/// Rewrites documentation index files from repository state.
pub trait DocsRegenerator {
    /// Regenerates documentation under `workdir`.
    fn regenerate(&self, workdir: &Path) -> Result<()>;
}

/// Runs an external command in the working tree.
#[derive(Debug, Clone)]
pub struct CommandDocsRegenerator {
    command: String,
}

impl CommandDocsRegenerator {
    /// Creates a regenerator for a whitespace-separated command line.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl DocsRegenerator for CommandDocsRegenerator {
    fn regenerate(&self, workdir: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("Documentation command is empty");
        };

        let output = Command::new(program)
            .args(parts)
            .current_dir(workdir)
            .output()
            .with_context(|| format!("Failed to run documentation command: {}", self.command))?;

        if !output.status.success() {
            bail!(
                "Documentation command failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Built-in README generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadmeGenerator;

impl DocsRegenerator for ReadmeGenerator {
    fn regenerate(&self, workdir: &Path) -> Result<()> {
        let layout = PublicLayout::new(workdir);
        let notebooks_root = workdir.join(NOTEBOOKS_DIR);
        if !notebooks_root.is_dir() {
            debug!(dir = %notebooks_root.display(), "No notebooks directory; skipping documentation");
            return Ok(());
        }

        let mut sections = Vec::new();
        for category in Category::ALL {
            let dir = layout.category_dir(category);
            if !dir.is_dir() {
                continue;
            }
            let entries = notebook_entries(&layout, category, &dir)?;
            let readme = render_category_readme(category, &entries);
            write_if_changed(&dir.join("README.md"), &readme)?;
            sections.push((category, entries));
        }

        write_if_changed(&workdir.join(OVERVIEW_FILE), &render_overview(&sections))?;
        debug!(categories = sections.len(), "Regenerated documentation");
        Ok(())
    }
}

/// Title, description and flags extracted from a notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookMetadata {
    /// Title from the first markdown heading, or derived from the file name.
    pub title: String,
    /// First non-heading line of the first markdown cell.
    pub description: String,
    /// Whether any code cell mentions Plotly.
    pub has_plotly: bool,
}

#[derive(Deserialize)]
struct NotebookFile {
    #[serde(default)]
    cells: Vec<NotebookCell>,
}

#[derive(Deserialize)]
struct NotebookCell {
    cell_type: String,
    #[serde(default)]
    source: Option<CellSource>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

impl NotebookMetadata {
    /// Reads metadata from a notebook file, falling back to name-derived
    /// defaults when the file cannot be parsed.
    pub fn load(path: &Path) -> Self {
        let fallback_title = title_from_file_name(path);
        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| {
                serde_json::from_str::<NotebookFile>(&content).map_err(anyhow::Error::from)
            });
        match parsed {
            Ok(notebook) => Self::from_notebook(&notebook, fallback_title),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read notebook metadata");
                Self {
                    title: fallback_title,
                    description: String::new(),
                    has_plotly: false,
                }
            }
        }
    }

    /// Parses metadata from notebook JSON.
    pub fn parse(json: &str, fallback_title: &str) -> Result<Self> {
        let notebook: NotebookFile =
            serde_json::from_str(json).context("Failed to parse notebook JSON")?;
        Ok(Self::from_notebook(&notebook, fallback_title.to_string()))
    }

    fn from_notebook(notebook: &NotebookFile, fallback_title: String) -> Self {
        let mut title = fallback_title;
        let mut description = String::new();

        let first_markdown = notebook
            .cells
            .iter()
            .filter(|cell| cell.cell_type == "markdown")
            .filter_map(|cell| cell.source.as_ref().map(CellSource::text))
            .find(|text| !text.trim().is_empty());

        if let Some(text) = first_markdown {
            let lines: Vec<&str> = text.trim().lines().collect();
            if let Some(heading) = lines.iter().find(|line| line.starts_with('#')) {
                title = heading.trim_start_matches('#').trim().to_string();
            }
            if let Some(line) = lines
                .iter()
                .find(|line| !line.starts_with('#') && !line.trim().is_empty())
            {
                description = truncate_description(line);
            }
        }

        let has_plotly = notebook
            .cells
            .iter()
            .filter(|cell| cell.cell_type == "code")
            .filter_map(|cell| cell.source.as_ref().map(CellSource::text))
            .any(|text| text.to_lowercase().contains("plotly"));

        Self {
            title,
            description,
            has_plotly,
        }
    }
}

fn truncate_description(line: &str) -> String {
    if line.chars().count() > DESCRIPTION_LIMIT {
        let truncated: String = line.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{truncated}...")
    } else {
        line.to_string()
    }
}

/// Derives a title from a file name: `sales_trends.ipynb` → `Sales Trends`.
fn title_from_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    stem.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
struct NotebookEntry {
    /// Path below the category folder, `/`-separated.
    relative: String,
    /// Rendered page below the category's docs folder, when one exists.
    html: Option<String>,
    metadata: NotebookMetadata,
}

fn notebook_entries(
    layout: &PublicLayout,
    category: Category,
    dir: &Path,
) -> Result<Vec<NotebookEntry>> {
    let mut files = Vec::new();
    collect_notebooks(dir, &mut files)?;
    files.sort();

    let docs_dir = layout.category_docs_dir(category);
    Ok(files
        .iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(dir).ok()?;
            let html = relative.with_extension("html");
            let html = docs_dir.join(&html).is_file().then(|| slash_path(&html));

            Some(NotebookEntry {
                relative: slash_path(relative),
                html,
                metadata: NotebookMetadata::load(path),
            })
        })
        .collect())
}

fn collect_notebooks(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for path in entries.filter_map(|entry| entry.ok().map(|e| e.path())) {
        let hidden = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }
        if path.is_dir() {
            collect_notebooks(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "ipynb") {
            files.push(path);
        }
    }
    Ok(())
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn render_category_readme(category: Category, entries: &[NotebookEntry]) -> String {
    let mut lines = vec![
        format!("# {}", category.title()),
        String::new(),
        category.description().to_string(),
        String::new(),
        "## 📚 Notebooks".to_string(),
        String::new(),
        "| Notebook | Description | View Options |".to_string(),
        "|----------|-------------|--------------|".to_string(),
    ];

    for entry in entries {
        let mut view = format!("[📓 Code]({})", entry.relative);
        if let Some(html) = &entry.html {
            view.push_str(&format!(
                " • [🌐 HTML](../../{DOCS_DIR}/{}/{html})",
                category.dir_name()
            ));
        }
        if entry.metadata.has_plotly {
            view.push_str(" 📊");
        }
        let description = if entry.metadata.description.is_empty() {
            "Analysis notebook"
        } else {
            entry.metadata.description.as_str()
        };
        lines.push(format!(
            "| **{}** | {} | {} |",
            entry.metadata.title, description, view
        ));
    }
    if entries.is_empty() {
        lines.push("| *No notebooks yet* | | |".to_string());
    }

    lines.extend([
        String::new(),
        "## 🎯 Key Objectives".to_string(),
        String::new(),
    ]);
    lines.extend(category.objectives().iter().map(|o| format!("- {o}")));
    lines.extend([
        String::new(),
        "## 🔗 Navigation".to_string(),
        String::new(),
        format!("- [← Back to Notebook Overview](../../{OVERVIEW_FILE})"),
        format!(
            "- [📊 Interactive Results](../../{DOCS_DIR}/{}/) - HTML versions with full Plotly rendering",
            category.dir_name()
        ),
    ]);

    lines.join("\n") + "\n"
}

fn render_overview(sections: &[(Category, Vec<NotebookEntry>)]) -> String {
    let mut lines = vec![
        "# 📊 Notebook Overview".to_string(),
        String::new(),
        "Auto-generated overview of all published analysis notebooks.".to_string(),
        String::new(),
        "## 🎯 Quick Access - Interactive Results".to_string(),
        String::new(),
    ];

    for (category, entries) in sections {
        lines.push(format!("### {}", category.title()));
        for entry in entries {
            if let Some(html) = &entry.html {
                lines.push(format!(
                    "- [📊 {}]({DOCS_DIR}/{}/{html})",
                    entry.metadata.title,
                    category.dir_name()
                ));
            }
        }
        lines.push(String::new());
    }

    lines.extend([
        "## 👨‍💻 Technical Notebooks".to_string(),
        String::new(),
    ]);
    for (category, _) in sections {
        lines.push(format!(
            "### [{}]({NOTEBOOKS_DIR}/{}/)",
            category.title(),
            category.dir_name()
        ));
        lines.push(category.description().to_string());
        lines.push(String::new());
    }

    lines.push("---".to_string());
    lines.push("*Auto-generated by nb-publish*".to_string());
    lines.join("\n") + "\n"
}

fn write_if_changed(path: &Path, content: &str) -> Result<()> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
