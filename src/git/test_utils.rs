//! Shared test utilities for the `git` module.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tempfile::TempDir;

use crate::git::{CommitOutcome, StagedChanges, Vcs};

#[derive(Default)]
struct FakeState {
    head: BTreeMap<PathBuf, Vec<u8>>,
    parents: Vec<BTreeMap<PathBuf, Vec<u8>>>,
    index: BTreeMap<PathBuf, Vec<u8>>,
    tags: BTreeSet<String>,
    commits: Vec<String>,
    pushes: Vec<String>,
    calls: Vec<String>,
    failures: HashSet<String>,
    one_shot_failures: HashSet<String>,
}

/// In-memory stand-in for the public repository.
///
/// The working tree is a real temporary directory so materialization can
/// write into it; HEAD and the index are kept as path → content snapshots.
/// Every trait call is recorded, and any operation can be made to fail with
/// [`fail_on`](Self::fail_on).
pub(crate) struct FakeVcs {
    dir: TempDir,
    state: RefCell<FakeState>,
}

impl FakeVcs {
    /// Creates an empty repository with no commits and no tags.
    pub(crate) fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            state: RefCell::new(FakeState::default()),
        }
    }

    /// Adds pre-existing tags.
    pub(crate) fn with_tags(self, tags: &[&str]) -> Self {
        self.state
            .borrow_mut()
            .tags
            .extend(tags.iter().map(ToString::to_string));
        self
    }

    /// Makes every later call to `operation` return an error.
    pub(crate) fn fail_on(&self, operation: &str) {
        self.state.borrow_mut().failures.insert(operation.to_string());
    }

    /// Makes only the next call to `operation` return an error.
    pub(crate) fn fail_once(&self, operation: &str) {
        self.state
            .borrow_mut()
            .one_shot_failures
            .insert(operation.to_string());
    }

    /// Stages a file as an interrupted earlier run would have left it.
    pub(crate) fn leave_staged(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        self.state
            .borrow_mut()
            .index
            .insert(PathBuf::from(relative), content.as_bytes().to_vec());
    }

    /// Tag names in sorted order.
    pub(crate) fn tags(&self) -> Vec<String> {
        self.state.borrow().tags.iter().cloned().collect()
    }

    /// Commit messages, oldest first.
    pub(crate) fn commits(&self) -> Vec<String> {
        self.state.borrow().commits.clone()
    }

    /// Pushes as `branch:<name>` or `tag:<name>`, in order.
    pub(crate) fn pushes(&self) -> Vec<String> {
        self.state.borrow().pushes.clone()
    }

    /// Names of every trait method called, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Whether `relative` exists in the committed snapshot.
    pub(crate) fn head_contains(&self, relative: &str) -> bool {
        self.state.borrow().head.contains_key(Path::new(relative))
    }

    fn record(&self, operation: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(operation.to_string());
        if state.failures.contains(operation) || state.one_shot_failures.remove(operation) {
            bail!("injected {operation} failure");
        }
        Ok(())
    }

    fn snapshot_worktree(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect_files(self.dir.path(), self.dir.path(), &mut files);
        files
    }

    fn diff(
        from: &BTreeMap<PathBuf, Vec<u8>>,
        to: &BTreeMap<PathBuf, Vec<u8>>,
    ) -> StagedChanges {
        let mut files = Vec::new();
        for (path, content) in to {
            match from.get(path) {
                None => files.push(format!("A  {}", path.display())),
                Some(old) if old != content => files.push(format!("M  {}", path.display())),
                Some(_) => {}
            }
        }
        for path in from.keys().filter(|p| !to.contains_key(*p)) {
            files.push(format!("D  {}", path.display()));
        }
        StagedChanges { files }
    }
}

fn collect_files(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, files);
        } else if let Ok(content) = fs::read(&path) {
            files.insert(path.strip_prefix(root).unwrap().to_path_buf(), content);
        }
    }
}

impl Vcs for FakeVcs {
    fn workdir(&self) -> &Path {
        self.dir.path()
    }

    fn staged_changes(&self) -> Result<StagedChanges> {
        self.record("staged_changes")?;
        let state = self.state.borrow();
        Ok(Self::diff(&state.head, &state.index))
    }

    fn reset_index(&mut self) -> Result<()> {
        self.record("reset_index")?;
        let mut state = self.state.borrow_mut();
        state.index = state.head.clone();
        Ok(())
    }

    fn restore_worktree(&mut self) -> Result<()> {
        self.record("restore_worktree")?;
        let current = self.snapshot_worktree();
        let mut state = self.state.borrow_mut();
        for path in current.keys() {
            if !state.head.contains_key(path) {
                fs::remove_file(self.dir.path().join(path))?;
            }
        }
        for (path, content) in &state.head {
            let target = self.dir.path().join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, content)?;
        }
        state.index = state.head.clone();
        Ok(())
    }

    fn stage_all(&mut self) -> Result<StagedChanges> {
        self.record("stage_all")?;
        let snapshot = self.snapshot_worktree();
        let mut state = self.state.borrow_mut();
        state.index = snapshot;
        Ok(Self::diff(&state.head, &state.index))
    }

    fn commit(&mut self, message: &str) -> Result<CommitOutcome> {
        self.record("commit")?;
        let mut state = self.state.borrow_mut();
        if state.index == state.head {
            return Ok(CommitOutcome::NothingToCommit);
        }
        let committed = state.index.clone();
        let previous = std::mem::replace(&mut state.head, committed);
        state.parents.push(previous);
        state.commits.push(message.to_string());
        Ok(CommitOutcome::Committed {
            id: format!("{:040x}", state.commits.len()),
        })
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        self.record("list_tags")?;
        let prefix = pattern.trim_end_matches('*');
        Ok(self
            .state
            .borrow()
            .tags
            .iter()
            .filter(|t| t.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn create_tag(&mut self, name: &str, _message: &str) -> Result<()> {
        self.record("create_tag")?;
        if !self.state.borrow_mut().tags.insert(name.to_string()) {
            bail!("tag {name} already exists");
        }
        Ok(())
    }

    fn discard_commit(&mut self, commit: &str, tag: Option<&str>) -> Result<()> {
        self.record("discard_commit")?;
        {
            let mut state = self.state.borrow_mut();
            if format!("{:040x}", state.commits.len()) != commit {
                bail!("{commit} is not HEAD");
            }
            let Some(parent) = state.parents.pop() else {
                bail!("no commit to discard");
            };
            state.head = parent;
            state.commits.pop();
            if let Some(tag) = tag {
                state.tags.remove(tag);
            }
        }
        self.restore_worktree()
    }

    fn push_branch(&mut self, branch: &str) -> Result<()> {
        self.record("push_branch")?;
        self.state.borrow_mut().pushes.push(format!("branch:{branch}"));
        Ok(())
    }

    fn push_tag(&mut self, tag: &str) -> Result<()> {
        self.record("push_tag")?;
        self.state.borrow_mut().pushes.push(format!("tag:{tag}"));
        Ok(())
    }
}
