//! Git repository operations

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result};
use git2::build::CheckoutBuilder;
use git2::{IndexAddOption, Repository, ResetType, Signature, Status, StatusOptions, Tree};
use tracing::{debug, info};

use crate::error::PublishError;
use crate::git::{redact_remote, CommitOutcome, StagedChanges, Vcs, ORIGIN};

/// Public repository checkout used as the publish target.
///
/// Local object operations go through `git2`; network operations (clone,
/// fetch, push) run the `git` CLI so that the user's credential helpers apply.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Opens the repository at `path`.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        let workdir = repo
            .workdir()
            .context("Repository has no working directory")?
            .to_path_buf();

        Ok(Self { repo, workdir })
    }

    /// Clones `remote` into `workdir`, or reuses an existing clone, and checks
    /// out `branch` with tags fetched.
    pub fn clone_or_open(remote: &str, workdir: &Path, branch: &str) -> Result<Self> {
        if workdir.join(".git").exists() {
            debug!(workdir = %workdir.display(), "Reusing existing public checkout");
        } else {
            if let Some(parent) = workdir.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            info!(remote = %redact_remote(remote), workdir = %workdir.display(), "Cloning public repository");
            let output = Command::new("git")
                .arg("clone")
                .arg(remote)
                .arg(workdir)
                .env("GIT_TERMINAL_PROMPT", "0")
                .output()
                .context("Failed to execute git clone")?;
            if !output.status.success() {
                return Err(PublishError::RemoteUnreachable {
                    remote: redact_remote(remote),
                    reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }
                .into());
            }
        }

        let repository = Self::open_at(workdir)?;
        repository
            .run_git(&["fetch", "--tags", "--prune", ORIGIN])
            .map_err(|e| PublishError::RemoteUnreachable {
                remote: redact_remote(remote),
                reason: format!("{e:#}"),
            })?;
        repository.checkout_branch(branch)?;

        Ok(repository)
    }

    /// Switches to `branch`, fast-forwarding it to the remote tip when one
    /// exists. An empty remote leaves HEAD unborn on `branch`.
    fn checkout_branch(&self, branch: &str) -> Result<()> {
        let remote_ref = format!("refs/remotes/{ORIGIN}/{branch}");
        let remote_exists = self.repo.find_reference(&remote_ref).is_ok();

        if self.repo.head().is_err() {
            if remote_exists {
                self.run_git(&["checkout", branch])?;
            } else {
                self.repo
                    .set_head(&format!("refs/heads/{branch}"))
                    .context("Failed to point HEAD at publish branch")?;
            }
            return Ok(());
        }

        if self.current_branch().as_deref() != Some(branch) {
            if remote_exists || self.repo.find_branch(branch, git2::BranchType::Local).is_ok() {
                self.run_git(&["checkout", branch])?;
            } else {
                self.run_git(&["checkout", "-b", branch])?;
            }
        }

        if remote_exists {
            self.run_git(&["merge", "--ff-only", &format!("{ORIGIN}/{branch}")])
                .with_context(|| format!("Local {branch} has diverged from {ORIGIN}/{branch}"))?;
        }

        Ok(())
    }

    fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        head.shorthand()
            .filter(|name| *name != "HEAD")
            .map(ToString::to_string)
    }

    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(
                head.peel_to_tree().context("Failed to peel HEAD to tree")?,
            )),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to get HEAD reference"),
        }
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature.to_owned()),
            Err(_) => Signature::now("nb-publish", "nb-publish@localhost")
                .context("Failed to create commit signature"),
        }
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git {} failed: {}", args.join(" "), error_msg.trim());
        }

        Ok(output)
    }

    fn push(&self, refspec: &str, target: &str) -> Result<()> {
        self.run_git(&["push", ORIGIN, refspec])
            .map_err(|e| PublishError::Push {
                target: target.to_string(),
                reason: format!("{e:#}"),
            })?;
        Ok(())
    }
}

impl Vcs for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn staged_changes(&self) -> Result<StagedChanges> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .context("Failed to get repository status")?;

        let files = statuses
            .iter()
            .filter(|entry| {
                entry.status().intersects(
                    Status::INDEX_NEW
                        | Status::INDEX_MODIFIED
                        | Status::INDEX_DELETED
                        | Status::INDEX_RENAMED
                        | Status::INDEX_TYPECHANGE,
                )
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .map(|path| format!("{} {}", format_status_flags(entry.status()), path))
            })
            .collect();

        Ok(StagedChanges { files })
    }

    fn reset_index(&mut self) -> Result<()> {
        match self.repo.head() {
            Ok(head) => {
                let target = head
                    .peel(git2::ObjectType::Commit)
                    .context("Failed to peel HEAD to commit")?;
                self.repo
                    .reset(&target, ResetType::Mixed, None)
                    .context("Failed to reset index")?;
            }
            Err(_) => {
                let mut index = self.repo.index().context("Failed to open index")?;
                index.clear().context("Failed to clear index")?;
                index.write().context("Failed to write index")?;
            }
        }
        Ok(())
    }

    fn restore_worktree(&mut self) -> Result<()> {
        self.reset_index()?;

        if self.repo.head().is_ok() {
            let mut checkout = CheckoutBuilder::new();
            checkout.force().remove_untracked(true);
            self.repo
                .checkout_head(Some(&mut checkout))
                .context("Failed to restore working tree")?;
            return Ok(());
        }

        // Unborn HEAD: every file is untracked.
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .context("Failed to get repository status")?;
        for entry in statuses.iter() {
            if let Some(path) = entry.path() {
                let full = self.workdir.join(path);
                if full.is_file() {
                    fs::remove_file(&full)
                        .with_context(|| format!("Failed to remove {}", full.display()))?;
                }
            }
        }
        Ok(())
    }

    fn stage_all(&mut self) -> Result<StagedChanges> {
        let mut index = self.repo.index().context("Failed to open index")?;
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .context("Failed to stage changes")?;
        index
            .update_all(["*"].iter(), None)
            .context("Failed to stage deletions")?;
        index.write().context("Failed to write index")?;

        self.staged_changes()
    }

    fn commit(&mut self, message: &str) -> Result<CommitOutcome> {
        let mut index = self.repo.index().context("Failed to open index")?;
        let tree_id = index.write_tree().context("Failed to write tree")?;
        let head_tree = self.head_tree()?;

        if head_tree.as_ref().map(Tree::id) == Some(tree_id) {
            return Ok(CommitOutcome::NothingToCommit);
        }
        if head_tree.is_none() && index.is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id).context("Failed to find tree")?;
        let signature = self.signature()?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().context("Failed to peel HEAD to commit")?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .context("Failed to create commit")?;

        Ok(CommitOutcome::Committed {
            id: oid.to_string(),
        })
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        let names = self
            .repo
            .tag_names(Some(pattern))
            .context("Failed to list tags")?;

        Ok(names.iter().flatten().map(ToString::to_string).collect())
    }

    fn create_tag(&mut self, name: &str, message: &str) -> Result<()> {
        let target = self
            .repo
            .head()
            .context("Failed to get HEAD")?
            .peel(git2::ObjectType::Commit)
            .context("Failed to peel HEAD to commit")?;
        let signature = self.signature()?;

        self.repo
            .tag(name, &target, &signature, message, false)
            .with_context(|| format!("Failed to create tag {name}"))?;
        Ok(())
    }

    fn discard_commit(&mut self, commit: &str, tag: Option<&str>) -> Result<()> {
        let mut head = self.repo.head().context("Failed to get HEAD")?;
        let head_commit = head.peel_to_commit().context("Failed to peel HEAD to commit")?;
        if head_commit.id().to_string() != commit {
            anyhow::bail!(
                "HEAD is {} rather than {commit}; not discarding",
                head_commit.id()
            );
        }

        if let Some(tag) = tag {
            if self.repo.find_reference(&format!("refs/tags/{tag}")).is_ok() {
                self.repo
                    .tag_delete(tag)
                    .with_context(|| format!("Failed to delete tag {tag}"))?;
            }
        }

        match head_commit.parent(0) {
            Ok(parent) => {
                self.repo
                    .reset(parent.as_object(), ResetType::Soft, None)
                    .context("Failed to move HEAD to the previous commit")?;
            }
            // First commit on the branch: drop the branch so HEAD is unborn again.
            Err(_) => {
                head.delete().context("Failed to delete branch reference")?;
            }
        }
        debug!(commit, "Discarded local commit");
        drop(head_commit);
        drop(head);

        self.restore_worktree()
    }

    fn push_branch(&mut self, branch: &str) -> Result<()> {
        self.push(&format!("HEAD:refs/heads/{branch}"), branch)
    }

    fn push_tag(&mut self, tag: &str) -> Result<()> {
        self.push(&format!("refs/tags/{tag}"), tag)
    }
}

/// Formats git status flags into string representation
fn format_status_flags(flags: Status) -> String {
    let mut status = String::new();

    if flags.contains(Status::INDEX_NEW) {
        status.push('A');
    } else if flags.contains(Status::INDEX_MODIFIED) {
        status.push('M');
    } else if flags.contains(Status::INDEX_DELETED) {
        status.push('D');
    } else if flags.contains(Status::INDEX_RENAMED) {
        status.push('R');
    } else if flags.contains(Status::INDEX_TYPECHANGE) {
        status.push('T');
    } else {
        status.push(' ');
    }

    if flags.contains(Status::WT_NEW) {
        status.push('?');
    } else if flags.contains(Status::WT_MODIFIED) {
        status.push('M');
    } else if flags.contains(Status::WT_DELETED) {
        status.push('D');
    } else {
        status.push(' ');
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, GitRepository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        let repository = GitRepository::open_at(dir.path()).unwrap();
        (dir, repository)
    }

    #[test]
    fn empty_tree_has_nothing_to_commit() {
        let (_dir, mut repo) = init_repo();
        assert!(repo.stage_all().unwrap().is_empty());
        assert_eq!(repo.commit("empty").unwrap(), CommitOutcome::NothingToCommit);
    }

    #[test]
    fn commit_then_recommit_is_a_no_op() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("report.html"), "<html></html>").unwrap();

        let staged = repo.stage_all().unwrap();
        assert_eq!(staged.files, vec!["A  report.html".to_string()]);
        assert!(matches!(
            repo.commit("first").unwrap(),
            CommitOutcome::Committed { .. }
        ));

        assert!(repo.stage_all().unwrap().is_empty());
        assert_eq!(repo.commit("second").unwrap(), CommitOutcome::NothingToCommit);
    }

    #[test]
    fn tags_are_listed_by_pattern() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        repo.stage_all().unwrap();
        repo.commit("init").unwrap();

        repo.create_tag("v2024-03-09.1", "one").unwrap();
        repo.create_tag("v2024-03-10.1", "other day").unwrap();

        assert_eq!(
            repo.list_tags("v2024-03-09.*").unwrap(),
            vec!["v2024-03-09.1".to_string()]
        );
    }

    #[test]
    fn restore_worktree_discards_untracked_and_modified_files() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("kept.txt"), "original").unwrap();
        repo.stage_all().unwrap();
        repo.commit("init").unwrap();

        fs::write(dir.path().join("kept.txt"), "changed").unwrap();
        fs::write(dir.path().join("stray.txt"), "new").unwrap();
        repo.stage_all().unwrap();
        repo.restore_worktree().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("kept.txt")).unwrap(), "original");
        assert!(!dir.path().join("stray.txt").exists());
        assert!(repo.staged_changes().unwrap().is_empty());
    }

    #[test]
    fn reset_index_keeps_files_but_unstages_them() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        repo.stage_all().unwrap();
        repo.commit("init").unwrap();

        fs::write(dir.path().join("b.txt"), "b").unwrap();
        assert!(!repo.stage_all().unwrap().is_empty());
        repo.reset_index().unwrap();

        assert!(repo.staged_changes().unwrap().is_empty());
        assert!(dir.path().join("b.txt").exists());
    }

    #[test]
    fn discard_commit_returns_to_the_parent() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        repo.stage_all().unwrap();
        let CommitOutcome::Committed { id: first } = repo.commit("first").unwrap() else {
            panic!("expected a commit");
        };

        fs::write(dir.path().join("b.txt"), "b").unwrap();
        repo.stage_all().unwrap();
        let CommitOutcome::Committed { id: second } = repo.commit("second").unwrap() else {
            panic!("expected a commit");
        };
        repo.create_tag("v2024-03-09.1", "tag").unwrap();

        repo.discard_commit(&second, Some("v2024-03-09.1")).unwrap();

        let head = repo.repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.id().to_string(), first);
        assert!(repo.list_tags("v2024-03-09.*").unwrap().is_empty());
        assert!(!dir.path().join("b.txt").exists());
        assert!(dir.path().join("a.txt").exists());
        assert!(repo.staged_changes().unwrap().is_empty());
    }

    #[test]
    fn discarding_the_first_commit_leaves_head_unborn() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        repo.stage_all().unwrap();
        let CommitOutcome::Committed { id } = repo.commit("first").unwrap() else {
            panic!("expected a commit");
        };

        repo.discard_commit(&id, None).unwrap();

        assert!(repo.repo.head().is_err());
        assert!(!dir.path().join("a.txt").exists());
        assert!(repo.stage_all().unwrap().is_empty());
    }

    #[test]
    fn discard_commit_refuses_a_commit_that_is_not_head() {
        let (dir, mut repo) = init_repo();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        repo.stage_all().unwrap();
        repo.commit("first").unwrap();

        assert!(repo.discard_commit(&"0".repeat(40), None).is_err());
        assert!(dir.path().join("a.txt").exists());
    }

    #[test]
    fn status_flags_format() {
        assert_eq!(format_status_flags(Status::INDEX_NEW), "A ");
        assert_eq!(
            format_status_flags(Status::INDEX_MODIFIED | Status::WT_MODIFIED),
            "MM"
        );
        assert_eq!(format_status_flags(Status::WT_NEW), " ?");
    }
}
