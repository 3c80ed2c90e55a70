//! Publish command: scan, select, publish and report.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;

use crate::cli::formatting::{format_outcome, format_totals};
use crate::config::{ConfigOverrides, PublishConfig};
use crate::data::{to_yaml, ArtifactKind, Category, CommitType};
use crate::git::{redact_remote, BranchResolver, GitRepository};
use crate::publish::{
    ArtifactScanner, Catalog, CommandDocsRegenerator, DocsRegenerator, NbconvertRenderer,
    OutcomeStatus, Operator, PublishSession, ReadmeGenerator, Renderer, Selection, Suggestion,
};
use crate::utils::check_publish_prerequisites;

/// Publish command options.
#[derive(Parser)]
pub struct PublishCommand {
    /// Lists discovered categories and artifacts as YAML, then exits.
    #[arg(short, long)]
    pub list: bool,

    /// Publishes every discovered category without asking.
    #[arg(long, conflicts_with = "category")]
    pub all: bool,

    /// Publishes only the named category (repeatable).
    #[arg(long, value_name = "NAME")]
    pub category: Vec<Category>,

    /// Accepts the suggested commit type and summary without prompting.
    #[arg(short, long)]
    pub yes: bool,

    /// Copies notebooks without rendering HTML.
    #[arg(long)]
    pub no_render: bool,

    /// Remote URL of the public repository.
    #[arg(long, value_name = "URL")]
    pub remote: Option<String>,

    /// Private directory scanned for artifacts.
    #[arg(long, value_name = "DIR")]
    pub staging_root: Option<PathBuf>,

    /// Local checkout of the public repository.
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,
}

#[derive(Serialize)]
struct CategoryListing {
    category: Category,
    artifacts: Vec<ArtifactListing>,
}

#[derive(Serialize)]
struct ArtifactListing {
    path: PathBuf,
    kind: ArtifactKind,
}

impl PublishCommand {
    /// Executes the publish command.
    pub fn execute(self) -> Result<()> {
        let config = PublishConfig::load(ConfigOverrides {
            remote_url: self.remote.clone(),
            staging_root: self.staging_root.clone(),
            workdir: self.workdir.clone(),
        })?;

        let catalog = ArtifactScanner::new()?.scan(&config.staging_root)?;

        if self.list {
            print!("{}", to_yaml(&listing(&catalog))?);
            return Ok(());
        }

        if catalog.is_empty() {
            println!(
                "\u{2728} Nothing to publish in {}",
                config.staging_root.display()
            );
            return Ok(());
        }

        let render_program = (!self.no_render).then_some(config.render_command.as_str());
        check_publish_prerequisites(render_program)?;

        let remote = config.require_remote()?;
        let branch = BranchResolver::new(config.branch_aliases.clone()).resolve(remote)?;
        println!(
            "\u{1f517} Publishing to {} ({branch})",
            redact_remote(remote)
        );

        let mut repo = GitRepository::clone_or_open(remote, &config.workdir, &branch)
            .context("Failed to prepare the public repository")?;

        let renderer = render_program.map(NbconvertRenderer::new);
        let docs: Box<dyn DocsRegenerator> = match &config.docs_command {
            Some(command) => Box::new(CommandDocsRegenerator::new(command.clone())),
            None => Box::new(ReadmeGenerator),
        };

        let preset = if self.all {
            Some(Selection::All)
        } else if !self.category.is_empty() {
            Some(Selection::Only(self.category.clone()))
        } else {
            None
        };
        let mut reader = io::BufReader::new(io::stdin());
        let mut operator = PromptOperator::new(
            preset,
            self.yes,
            io::stdin().is_terminal(),
            &mut reader,
        );

        let session = PublishSession::new(catalog);
        let report = session.run(
            &mut repo,
            &mut operator,
            renderer.as_ref().map(|r| r as &dyn Renderer),
            &*docs,
            &branch,
            || Local::now().fixed_offset(),
        )?;

        if report.is_empty() {
            println!("\u{2139}\u{fe0f}  No categories selected");
            return Ok(());
        }

        println!();
        for (category, outcome) in &report.outcomes {
            println!("{}", format_outcome(*category, outcome));
        }
        println!("{}", format_totals(&report));

        if report.has_failures() {
            bail!(
                "{} of {} categories failed to publish",
                report.count(OutcomeStatus::Failed),
                report.outcomes.len()
            );
        }
        Ok(())
    }
}

fn listing(catalog: &Catalog) -> Vec<CategoryListing> {
    catalog
        .iter()
        .map(|(category, artifacts)| CategoryListing {
            category: *category,
            artifacts: artifacts
                .iter()
                .map(|a| ArtifactListing {
                    path: a.relative_path.clone(),
                    kind: a.kind,
                })
                .collect(),
        })
        .collect()
}

/// Operator that asks on the terminal.
///
/// `is_terminal` and `reader` are injected so tests can drive the prompts
/// without blocking on real stdin.
pub(crate) struct PromptOperator<'r> {
    preset: Option<Selection>,
    accept_suggestions: bool,
    is_terminal: bool,
    reader: &'r mut (dyn BufRead + Send),
}

impl<'r> PromptOperator<'r> {
    pub(crate) fn new(
        preset: Option<Selection>,
        accept_suggestions: bool,
        is_terminal: bool,
        reader: &'r mut (dyn BufRead + Send),
    ) -> Self {
        Self {
            preset,
            accept_suggestions,
            is_terminal,
            reader,
        }
    }

    /// Reads one trimmed line, or `None` on EOF.
    fn read_answer(&mut self) -> Result<Option<String>> {
        io::stdout().flush()?;
        let mut input = String::new();
        let bytes = self
            .reader
            .read_line(&mut input)
            .context("Failed to read user input")?;
        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }
}

impl Operator for PromptOperator<'_> {
    fn select_categories(&mut self, available: &[(Category, usize)]) -> Result<Vec<Category>> {
        let listed: Vec<Category> = available.iter().map(|(c, _)| *c).collect();

        if let Some(selection) = &self.preset {
            return Ok(selection.apply(&listed));
        }

        println!("\n\u{1f4e6} Categories with staged artifacts:");
        for (index, (category, count)) in available.iter().enumerate() {
            let noun = if *count == 1 { "artifact" } else { "artifacts" };
            println!("  {}. {category} ({count} {noun})", index + 1);
        }
        println!();

        if !self.is_terminal {
            eprintln!(
                "warning: stdin is not interactive, no categories selected (pass --all or --category)"
            );
            return Ok(Vec::new());
        }

        loop {
            print!("\u{2753} Publish which categories? [all/none or numbers/names, e.g. 1,3] ");
            let Some(answer) = self.read_answer()? else {
                eprintln!("warning: stdin closed, cancelling publish");
                return Ok(Vec::new());
            };
            match Selection::parse(&answer, &listed) {
                Ok(selection) => return Ok(selection.apply(&listed)),
                Err(e) => println!("{e}"),
            }
        }
    }

    fn confirm_commit(
        &mut self,
        category: Category,
        suggestion: Suggestion,
    ) -> Result<Option<Suggestion>> {
        if self.accept_suggestions || !self.is_terminal {
            return Ok(Some(suggestion));
        }

        println!(
            "\n\u{1f4dd} {category}: {}: {}",
            suggestion.commit_type, suggestion.summary
        );

        let commit_type = loop {
            print!(
                "\u{2753} Commit type [{}] (or 'skip'): ",
                suggestion.commit_type
            );
            let Some(answer) = self.read_answer()? else {
                eprintln!("warning: stdin closed, skipping {category}");
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "" => break suggestion.commit_type,
                "skip" | "s" => return Ok(None),
                other => match other.parse::<CommitType>() {
                    Ok(commit_type) => break commit_type,
                    Err(e) => println!("{e}"),
                },
            }
        };

        print!("\u{2753} Summary [{}]: ", suggestion.summary);
        let Some(answer) = self.read_answer()? else {
            eprintln!("warning: stdin closed, skipping {category}");
            return Ok(None);
        };
        let summary = if answer.is_empty() {
            suggestion.summary
        } else {
            answer
        };

        Ok(Some(Suggestion {
            commit_type,
            summary,
        }))
    }
}
