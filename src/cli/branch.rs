//! Branch command: print the branch publishes would target.

use anyhow::Result;
use clap::Parser;

use crate::config::{ConfigOverrides, PublishConfig};
use crate::git::BranchResolver;
use crate::utils::check_git_cli;

/// Branch command options.
#[derive(Parser)]
pub struct BranchCommand {
    /// Remote URL to inspect.
    #[arg(value_name = "REMOTE")]
    pub remote: String,
}

impl BranchCommand {
    /// Executes the branch command.
    pub fn execute(self) -> Result<()> {
        check_git_cli()?;
        let config = PublishConfig::load(ConfigOverrides::default())?;
        let branch = BranchResolver::new(config.branch_aliases).resolve(&self.remote)?;
        println!("{branch}");
        Ok(())
    }
}
