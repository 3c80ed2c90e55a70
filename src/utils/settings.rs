//! User-level fallbacks kept in `~/.nb-publish/settings.json`.
//!
//! The file holds an `env` map with the same keys as the `NB_PUBLISH_*`
//! environment variables. It is consulted only for keys the environment
//! leaves unset.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const SETTINGS_DIR: &str = ".nb-publish";
const SETTINGS_FILE: &str = "settings.json";

/// Parsed settings file.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Fallback values keyed by environment variable name.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Location of the settings file in the user's home directory.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// Reads the settings file at `path`. A missing file yields no values.
    pub fn read(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read settings file: {}", path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Value stored for `key`, ignoring blank entries.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.env
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}
