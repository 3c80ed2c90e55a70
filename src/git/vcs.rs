//! Version-control seam used by the publish pipeline.

use std::path::Path;

use anyhow::Result;

/// Result of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created.
    Committed {
        /// Full hash of the new commit.
        id: String,
    },
    /// The index matched HEAD, so nothing was committed.
    NothingToCommit,
}

/// Paths staged relative to HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedChanges {
    /// Staged entries formatted as `<status> <path>`.
    pub files: Vec<String>,
}

impl StagedChanges {
    /// Returns true when nothing differs from HEAD.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Working tree, index and tag namespace of the public repository.
///
/// One value owns the whole shared state; callers pass it by `&mut` so that
/// operations are strictly sequential.
pub trait Vcs {
    /// Root of the working tree.
    fn workdir(&self) -> &Path;

    /// Lists changes currently staged relative to HEAD.
    fn staged_changes(&self) -> Result<StagedChanges>;

    /// Unstages everything, leaving working-tree files untouched.
    fn reset_index(&mut self) -> Result<()>;

    /// Discards working-tree modifications and untracked files.
    fn restore_worktree(&mut self) -> Result<()>;

    /// Stages every working-tree change, including deletions.
    fn stage_all(&mut self) -> Result<StagedChanges>;

    /// Commits the index on the current branch.
    fn commit(&mut self, message: &str) -> Result<CommitOutcome>;

    /// Lists tag names matching a glob pattern.
    fn list_tags(&self, pattern: &str) -> Result<Vec<String>>;

    /// Creates an annotated tag on HEAD.
    fn create_tag(&mut self, name: &str, message: &str) -> Result<()>;

    /// Undoes `commit`, which must be HEAD, and deletes `tag` when given.
    ///
    /// HEAD moves back to the commit's parent (or becomes unborn again) and
    /// the working tree is restored to match it.
    fn discard_commit(&mut self, commit: &str, tag: Option<&str>) -> Result<()>;

    /// Pushes HEAD to `branch` on the remote.
    fn push_branch(&mut self, branch: &str) -> Result<()>;

    /// Pushes a single tag to the remote.
    fn push_tag(&mut self, tag: &str) -> Result<()>;
}
