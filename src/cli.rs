//! CLI interface for nb-publish.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod branch;
pub mod docs;
pub(crate) mod formatting;
pub mod publish;

/// nb-publish: publish categorized analysis notebooks with date-based version tags.
#[derive(Parser)]
#[command(name = "nb-publish")]
#[command(
    about = "Publish categorized analysis notebooks into a public git repository",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Publishes staged artifacts, one commit and version tag per category.
    Publish(publish::PublishCommand),
    /// Regenerates README indexes in the public checkout.
    Docs(docs::DocsCommand),
    /// Prints the branch a remote would be published to.
    Branch(branch::BranchCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Publish(publish_cmd) => publish_cmd.execute(),
            Commands::Docs(docs_cmd) => docs_cmd.execute(),
            Commands::Branch(branch_cmd) => branch_cmd.execute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Category;

    #[test]
    fn publish_flags_parse() {
        let cli = Cli::try_parse_from([
            "nb-publish",
            "publish",
            "--category",
            "model_training",
            "--category",
            "results_visualization",
            "--yes",
            "--no-render",
        ])
        .unwrap();
        let Commands::Publish(cmd) = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(
            cmd.category,
            vec![Category::ModelTraining, Category::ResultsVisualization]
        );
        assert!(cmd.yes && cmd.no_render && !cmd.all && !cmd.list);
    }

    #[test]
    fn all_conflicts_with_category() {
        assert!(Cli::try_parse_from([
            "nb-publish",
            "publish",
            "--all",
            "--category",
            "model_training"
        ])
        .is_err());
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["nb-publish", "publish", "--category", "dashboards"]).is_err());
    }

    #[test]
    fn short_list_flag() {
        let cli = Cli::try_parse_from(["nb-publish", "publish", "-l"]).unwrap();
        assert!(matches!(cli.command, Commands::Publish(cmd) if cmd.list));
    }
}
