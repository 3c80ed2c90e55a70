//! Docs command: regenerate documentation indexes in the public checkout.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::config::{ConfigOverrides, PublishConfig};
use crate::publish::{CommandDocsRegenerator, DocsRegenerator, ReadmeGenerator};

/// Docs command options.
#[derive(Parser)]
pub struct DocsCommand {
    /// Local checkout of the public repository.
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,
}

impl DocsCommand {
    /// Executes the docs command.
    pub fn execute(self) -> Result<()> {
        let config = PublishConfig::load(ConfigOverrides {
            workdir: self.workdir,
            ..ConfigOverrides::default()
        })?;

        if !config.workdir.is_dir() {
            bail!(
                "Public checkout not found at {}. Run `nb-publish publish` first or pass --workdir",
                config.workdir.display()
            );
        }

        match &config.docs_command {
            Some(command) => CommandDocsRegenerator::new(command.clone()).regenerate(&config.workdir)?,
            None => ReadmeGenerator.regenerate(&config.workdir)?,
        }

        println!(
            "\u{1f4da} Documentation regenerated in {}",
            config.workdir.display()
        );
        Ok(())
    }
}
