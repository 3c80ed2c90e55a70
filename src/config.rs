//! Publish configuration resolved from flags, environment and settings.

use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::error::PublishError;
use crate::utils::Settings;

/// Environment key for the public repository's remote URL.
pub const REMOTE_URL_KEY: &str = "NB_PUBLISH_REMOTE_URL";
/// Environment key for the staging root.
pub const STAGING_ROOT_KEY: &str = "NB_PUBLISH_STAGING_ROOT";
/// Environment key for the public repository's local checkout.
pub const WORKDIR_KEY: &str = "NB_PUBLISH_WORKDIR";
/// Environment key for the program that provides `nbconvert`.
pub const RENDER_COMMAND_KEY: &str = "NB_PUBLISH_RENDER_COMMAND";
/// Environment key for an external documentation command.
pub const DOCS_COMMAND_KEY: &str = "NB_PUBLISH_DOCS_COMMAND";
/// Environment key for extra branch names to try on the remote.
pub const BRANCH_ALIASES_KEY: &str = "NB_PUBLISH_BRANCH_ALIASES";

const DEFAULT_STAGING_ROOT: &str = "notebooks";
const DEFAULT_WORKDIR: &str = ".nb-publish/public";
const DEFAULT_RENDER_COMMAND: &str = "jupyter";

/// Values given on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--remote`
    pub remote_url: Option<String>,
    /// `--staging-root`
    pub staging_root: Option<PathBuf>,
    /// `--workdir`
    pub workdir: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Remote URL of the public repository, if configured.
    pub remote_url: Option<String>,
    /// Private working area scanned for artifacts.
    pub staging_root: PathBuf,
    /// Local checkout of the public repository.
    pub workdir: PathBuf,
    /// Program invoked as `<program> nbconvert`.
    pub render_command: String,
    /// External documentation command replacing the built-in generator.
    pub docs_command: Option<String>,
    /// Extra branch names tried after `main`, `master` and `develop`.
    pub branch_aliases: Vec<String>,
}

impl PublishConfig {
    /// Resolves configuration from flags, the environment and
    /// `$HOME/.nb-publish/settings.json`.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let settings = Settings::read(&Settings::path()?)?;
        Ok(Self::from_sources(overrides, |key| {
            layered_lookup(key, |k| env::var(k).ok(), &settings)
        }))
    }

    /// Resolves configuration with `lookup` standing in for environment and
    /// settings. Empty values count as unset.
    pub fn from_sources(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            remote_url: overrides.remote_url.or_else(|| get(REMOTE_URL_KEY)),
            staging_root: overrides
                .staging_root
                .or_else(|| get(STAGING_ROOT_KEY).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_ROOT)),
            workdir: overrides
                .workdir
                .or_else(|| get(WORKDIR_KEY).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKDIR)),
            render_command: get(RENDER_COMMAND_KEY)
                .unwrap_or_else(|| DEFAULT_RENDER_COMMAND.to_string()),
            docs_command: get(DOCS_COMMAND_KEY),
            branch_aliases: get(BRANCH_ALIASES_KEY)
                .map(|aliases| {
                    aliases
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Remote URL, required for publishing.
    pub fn require_remote(&self) -> Result<&str> {
        self.remote_url
            .as_deref()
            .ok_or_else(|| PublishError::RemoteNotConfigured.into())
    }
}

/// Looks `key` up in the environment, then in the settings file. A blank
/// environment value falls through to the file.
fn layered_lookup(
    key: &str,
    environment: impl Fn(&str) -> Option<String>,
    settings: &Settings,
) -> Option<String> {
    environment(key)
        .filter(|v| !v.trim().is_empty())
        .or_else(|| settings.value(key).map(ToString::to_string))
}
