//! Classified publish failures.

use std::path::PathBuf;

use thiserror::Error;

/// Failures the publish pipeline reports by class.
#[derive(Error, Debug)]
pub enum PublishError {
    /// A required external program is not installed.
    #[error("Required tool '{tool}' is not installed or not in PATH")]
    MissingTool {
        /// Program name.
        tool: String,
    },

    /// The public repository's remote could not be reached.
    #[error("Remote {remote} is unreachable: {reason}")]
    RemoteUnreachable {
        /// Redacted remote address.
        remote: String,
        /// Underlying failure.
        reason: String,
    },

    /// No remote address was configured.
    #[error("No remote repository configured. Pass --remote or set NB_PUBLISH_REMOTE_URL")]
    RemoteNotConfigured,

    /// Existing tags could not be listed, so no version can be allocated.
    #[error("Failed to list version tags: {0}")]
    TagListing(String),

    /// The day's highest version tag already uses the largest sequence number.
    #[error("No version left to allocate after {0}")]
    VersionsExhausted(String),

    /// An artifact could not be copied into the public tree.
    #[error("Failed to copy {path} into the public tree: {reason}")]
    Copy {
        /// Source artifact path.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// A source document could not be rendered.
    #[error("Failed to render {path}: {reason}")]
    Render {
        /// Source document path.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// A push to the remote was rejected or failed.
    #[error("Failed to push {target}: {reason}")]
    Push {
        /// Branch or tag being pushed.
        target: String,
        /// Underlying failure.
        reason: String,
    },
}
