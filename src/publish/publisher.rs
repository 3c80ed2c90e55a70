//! Per-category publish state machine.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, error, info, warn};

use crate::data::{Artifact, Category, CommitRecord};
use crate::git::{allocate_version, CommitOutcome, Vcs, Version};
use crate::publish::classifier::Suggestion;
use crate::publish::docs::DocsRegenerator;
use crate::publish::materialize::{materialize, PublicLayout};
use crate::publish::render::Renderer;

/// Stage of a category publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    /// Artifacts are being discovered.
    Scanning,
    /// Artifacts are being copied and rendered into the public tree.
    Materializing,
    /// Documentation indexes are being regenerated.
    DocumentingUpdated,
    /// Changes are being staged and committed.
    Committing,
    /// The version tag is being created.
    Tagging,
    /// Branch and tag are being pushed.
    Pushing,
    /// The category finished.
    Done,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scanning => "scanning",
            Self::Materializing => "materializing",
            Self::DocumentingUpdated => "documenting",
            Self::Committing => "committing",
            Self::Tagging => "tagging",
            Self::Pushing => "pushing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a category outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Published or already up to date.
    Success,
    /// Committed and branch pushed, but the tag did not reach the remote.
    Partial,
    /// Nothing from this category reached the remote.
    Failed,
}

/// Result of publishing one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// Committed, tagged and pushed.
    Published {
        /// Allocated version.
        version: Version,
        /// New commit hash.
        commit: String,
        /// Documents published without a rendered page.
        degraded: Vec<String>,
    },
    /// The public tree already matched the staging area.
    Unchanged,
    /// The operator declined to publish this category.
    Skipped,
    /// The branch was pushed but the tag was not.
    Partial {
        /// Allocated version, present locally as a tag.
        version: Version,
        /// New commit hash.
        commit: String,
        /// Why the tag push failed.
        reason: String,
    },
    /// The category failed and nothing was pushed.
    Failed {
        /// Stage that failed.
        stage: PublishStage,
        /// Why it failed.
        reason: String,
    },
    /// Not attempted because an earlier category left a commit that could
    /// not be undone, and publishing on top of it would push it.
    NotAttempted,
}

impl CategoryOutcome {
    /// Coarse status used for the session exit code.
    pub const fn status(&self) -> OutcomeStatus {
        match self {
            Self::Published { .. } | Self::Unchanged | Self::Skipped => OutcomeStatus::Success,
            Self::Partial { .. } => OutcomeStatus::Partial,
            Self::Failed { .. } | Self::NotAttempted => OutcomeStatus::Failed,
        }
    }

    fn failed(stage: PublishStage, error: &anyhow::Error) -> Self {
        Self::Failed {
            stage,
            reason: format!("{error:#}"),
        }
    }
}

/// Drives one category through materialize, document, commit, tag and push.
pub struct CategoryPublisher<'a> {
    vcs: &'a mut dyn Vcs,
    renderer: Option<&'a dyn Renderer>,
    docs: &'a dyn DocsRegenerator,
    branch: &'a str,
    stranded: bool,
}

impl<'a> CategoryPublisher<'a> {
    /// Creates a publisher over the public repository.
    pub fn new(
        vcs: &'a mut dyn Vcs,
        renderer: Option<&'a dyn Renderer>,
        docs: &'a dyn DocsRegenerator,
        branch: &'a str,
    ) -> Self {
        Self {
            vcs,
            renderer,
            docs,
            branch,
            stranded: false,
        }
    }

    /// Whether the last publish failed after committing and the local commit
    /// could not be undone.
    pub const fn left_local_commit(&self) -> bool {
        self.stranded
    }

    /// Publishes `artifacts` as one commit and one version tag.
    ///
    /// Failures before the commit restore the working tree to HEAD so the
    /// next category starts clean. A tag or branch push failure discards the
    /// new commit and tag, so nothing of this category rides along with a
    /// later push.
    pub fn publish(
        &mut self,
        category: Category,
        artifacts: &[Artifact],
        suggestion: &Suggestion,
        now: DateTime<FixedOffset>,
    ) -> CategoryOutcome {
        debug!(%category, artifacts = artifacts.len(), "Publishing category");

        let layout = PublicLayout::new(self.vcs.workdir());
        let materialized = match materialize(&layout, artifacts, self.renderer) {
            Ok(materialized) => materialized,
            Err(e) => return self.abort(PublishStage::Materializing, &e),
        };

        if let Err(e) = self.docs.regenerate(self.vcs.workdir()) {
            let reason = format!("{e:#}");
            warn!(%category, error = %reason, "Documentation regeneration failed");
        }

        let staged = match self.vcs.stage_all() {
            Ok(staged) => staged,
            Err(e) => return self.abort(PublishStage::Committing, &e),
        };
        if staged.is_empty() {
            info!(%category, "No changes to publish");
            return CategoryOutcome::Unchanged;
        }
        debug!(%category, files = ?staged.files, "Staged changes");

        let version = match allocate_version(&*self.vcs, now.date_naive()) {
            Ok(version) => version,
            Err(e) => return self.abort(PublishStage::Committing, &e),
        };

        let record = CommitRecord {
            commit_type: suggestion.commit_type,
            summary: suggestion.summary.clone(),
            category,
            version,
            timestamp: now,
            artifacts: artifacts.iter().map(|a| a.base_name.clone()).collect(),
        };

        let commit = match self.vcs.commit(&record.message()) {
            Ok(CommitOutcome::Committed { id }) => id,
            Ok(CommitOutcome::NothingToCommit) => {
                info!(%category, "Nothing to commit");
                return CategoryOutcome::Unchanged;
            }
            Err(e) => return self.abort(PublishStage::Committing, &e),
        };

        let tag = version.to_string();
        if let Err(e) = self.vcs.create_tag(&tag, &record.tag_message()) {
            return self.unwind(PublishStage::Tagging, &e, &commit, None);
        }

        if let Err(e) = self.vcs.push_branch(self.branch) {
            return self.unwind(PublishStage::Pushing, &e, &commit, Some(tag.as_str()));
        }

        if let Err(e) = self.vcs.push_tag(&tag) {
            let reason = format!("{e:#}");
            warn!(%category, %tag, error = %reason, "Tag push failed after branch push");
            return CategoryOutcome::Partial {
                version,
                commit,
                reason,
            };
        }

        info!(%category, %version, "Published");
        CategoryOutcome::Published {
            version,
            commit,
            degraded: materialized.degraded,
        }
    }

    fn abort(&mut self, stage: PublishStage, error: &anyhow::Error) -> CategoryOutcome {
        let outcome = CategoryOutcome::failed(stage, error);
        warn!(%stage, "Category failed; restoring working tree");
        if let Err(e) = self.vcs.restore_worktree() {
            warn!(error = %e, "Failed to restore working tree");
        }
        outcome
    }

    fn unwind(
        &mut self,
        stage: PublishStage,
        error: &anyhow::Error,
        commit: &str,
        tag: Option<&str>,
    ) -> CategoryOutcome {
        warn!(%stage, commit, "Category failed after commit; discarding local commit");
        match self.vcs.discard_commit(commit, tag) {
            Ok(()) => CategoryOutcome::failed(stage, error),
            Err(e) => {
                self.stranded = true;
                error!(error = %e, commit, "Failed to discard local commit");
                CategoryOutcome::Failed {
                    stage,
                    reason: format!("{error:#}; local commit {commit} could not be undone: {e:#}"),
                }
            }
        }
    }
}
