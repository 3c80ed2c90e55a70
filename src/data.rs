//! Data model for publishable artifacts and the records written about them.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod artifact;
pub mod category;
pub mod commit_record;

pub use artifact::{Artifact, ArtifactKind};
pub use category::Category;
pub use commit_record::{CommitRecord, CommitType};

/// Serializes a data structure to a YAML string.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}
