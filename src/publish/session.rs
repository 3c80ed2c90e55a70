//! Operator-driven publish session over all discovered categories.

use anyhow::{bail, Result};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use crate::data::Category;
use crate::git::Vcs;
use crate::publish::classifier::{classify, Suggestion};
use crate::publish::docs::DocsRegenerator;
use crate::publish::publisher::{CategoryOutcome, CategoryPublisher, OutcomeStatus};
use crate::publish::render::Renderer;
use crate::publish::scanner::Catalog;

/// Decisions the session delegates to the person running it.
pub trait Operator {
    /// Chooses which of the discovered categories to publish.
    ///
    /// `available` pairs each category with its artifact count.
    fn select_categories(&mut self, available: &[(Category, usize)]) -> Result<Vec<Category>>;

    /// Confirms or overrides the suggested commit type and summary.
    ///
    /// `None` skips the category.
    fn confirm_commit(
        &mut self,
        category: Category,
        suggestion: Suggestion,
    ) -> Result<Option<Suggestion>>;
}

/// A category selection as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every discovered category.
    All,
    /// No category.
    Nothing,
    /// An explicit subset.
    Only(Vec<Category>),
}

impl Selection {
    /// Parses operator input against the listed categories.
    ///
    /// Accepts `all`/`a`, `none`/`n`/`q` (or empty input), and a list of
    /// 1-based numbers or category names separated by commas or spaces.
    pub fn parse(input: &str, listed: &[Category]) -> Result<Self> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "all" | "a" => return Ok(Self::All),
            "" | "none" | "n" | "q" | "quit" => return Ok(Self::Nothing),
            _ => {}
        }

        let mut chosen = Vec::new();
        for token in input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let category = match token.parse::<usize>() {
                Ok(number) => match number.checked_sub(1).and_then(|i| listed.get(i)) {
                    Some(category) => *category,
                    None => bail!("No category numbered {number}; choose 1-{}", listed.len()),
                },
                Err(_) => token.parse::<Category>()?,
            };
            if !chosen.contains(&category) {
                chosen.push(category);
            }
        }
        Ok(Self::Only(chosen))
    }

    /// Resolves the selection against the available categories, keeping
    /// the operator's order and dropping names with nothing to publish.
    pub fn apply(&self, available: &[Category]) -> Vec<Category> {
        match self {
            Self::All => available.to_vec(),
            Self::Nothing => Vec::new(),
            Self::Only(wanted) => {
                for category in wanted.iter().filter(|c| !available.contains(c)) {
                    warn!(%category, "Nothing staged for category; skipping");
                }
                wanted
                    .iter()
                    .copied()
                    .filter(|c| available.contains(c))
                    .collect()
            }
        }
    }
}

/// Non-interactive operator: applies a fixed selection and accepts every
/// suggestion.
#[derive(Debug, Clone)]
pub struct AcceptDefaults {
    selection: Selection,
}

impl AcceptDefaults {
    /// Creates an operator that always answers with `selection`.
    pub const fn new(selection: Selection) -> Self {
        Self { selection }
    }
}

impl Operator for AcceptDefaults {
    fn select_categories(&mut self, available: &[(Category, usize)]) -> Result<Vec<Category>> {
        let categories: Vec<Category> = available.iter().map(|(c, _)| *c).collect();
        Ok(self.selection.apply(&categories))
    }

    fn confirm_commit(
        &mut self,
        _category: Category,
        suggestion: Suggestion,
    ) -> Result<Option<Suggestion>> {
        Ok(Some(suggestion))
    }
}

/// Per-category outcomes of a session, in processing order.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Outcome of every selected category.
    pub outcomes: Vec<(Category, CategoryOutcome)>,
}

impl SessionReport {
    /// Whether any category failed outright.
    pub fn has_failures(&self) -> bool {
        self.count(OutcomeStatus::Failed) > 0
    }

    /// Number of categories with the given status.
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.status() == status)
            .count()
    }

    /// Whether no category was processed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// One run over the categories found in the staging area.
pub struct PublishSession {
    catalog: Catalog,
}

impl PublishSession {
    /// Creates a session over a scanned catalog.
    pub const fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Discovered categories with their artifact counts.
    pub fn categories(&self) -> Vec<(Category, usize)> {
        self.catalog
            .iter()
            .map(|(category, artifacts)| (*category, artifacts.len()))
            .collect()
    }

    /// Whether the staging area held nothing to publish.
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Publishes the operator's selection one category at a time.
    ///
    /// A category's failure is recorded in the report and does not stop
    /// the categories after it, unless it left a local commit behind that
    /// a later push would carry to the remote.
    pub fn run(
        &self,
        vcs: &mut dyn Vcs,
        operator: &mut dyn Operator,
        renderer: Option<&dyn Renderer>,
        docs: &dyn DocsRegenerator,
        branch: &str,
        now: impl Fn() -> DateTime<FixedOffset>,
    ) -> Result<SessionReport> {
        recover_interrupted(vcs)?;

        let mut report = SessionReport::default();
        if self.is_empty() {
            info!("Staging area is empty");
            return Ok(report);
        }

        let selected = operator.select_categories(&self.categories())?;
        debug!(?selected, "Selected categories");

        let mut remaining = selected.into_iter();
        while let Some(category) = remaining.next() {
            let Some(artifacts) = self.catalog.get(&category) else {
                continue;
            };

            let suggestion = classify(category, artifacts);
            let Some(suggestion) = operator.confirm_commit(category, suggestion)? else {
                info!(%category, "Skipped by operator");
                report.outcomes.push((category, CategoryOutcome::Skipped));
                continue;
            };

            let mut publisher = CategoryPublisher::new(&mut *vcs, renderer, docs, branch);
            let outcome = publisher.publish(category, artifacts, &suggestion, now());
            let halted = publisher.left_local_commit();
            report.outcomes.push((category, outcome));

            if halted {
                warn!(%category, "Stopping: an unpushed local commit remains in the public checkout");
                report
                    .outcomes
                    .extend(remaining.by_ref().map(|c| (c, CategoryOutcome::NotAttempted)));
            }
        }

        Ok(report)
    }
}

/// Unstages anything an interrupted earlier run left in the index.
fn recover_interrupted(vcs: &mut dyn Vcs) -> Result<()> {
    let staged = vcs.staged_changes()?;
    if staged.is_empty() {
        return Ok(());
    }
    warn!(
        files = staged.files.len(),
        "Found staged changes from an interrupted run; unstaging them"
    );
    vcs.reset_index()
}
