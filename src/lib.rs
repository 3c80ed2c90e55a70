//! # nb-publish
//!
//! Publishes analysis notebooks from a private staging area into a public
//! git repository. Artifacts are grouped by workflow category; each category
//! becomes one commit with a date-based version tag (`v<YYYY-MM-DD>.<N>`).
//!
//! ## Quick Start
//!
//! ```no_run
//! use nb_publish::publish::ArtifactScanner;
//!
//! let catalog = ArtifactScanner::new()?.scan(std::path::Path::new("notebooks"))?;
//! for (category, artifacts) in &catalog {
//!     println!("{category}: {} artifacts", artifacts.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod git;
pub mod publish;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::PublishError;

/// The current version of nb-publish.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
