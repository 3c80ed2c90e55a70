//! Git operations and repository management.

pub mod remote;
pub mod repository;
pub mod tags;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod vcs;

pub use remote::{redact_remote, BranchResolver, RemoteRefs};
pub use repository::GitRepository;
pub use tags::{allocate_version, Version};
pub use vcs::{CommitOutcome, StagedChanges, Vcs};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;

/// Name of the remote the public repository is cloned from.
pub const ORIGIN: &str = "origin";
