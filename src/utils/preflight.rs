//! Preflight validation checks for early failure detection.
//!
//! Commands call these before touching the public repository so that a
//! missing tool fails the run before any category is processed.

use std::process::Command;

use anyhow::Result;
use tracing::debug;

use crate::error::PublishError;

/// Checks that `program` runs and reports a version.
pub fn check_tool(program: &str, version_args: &[&str]) -> Result<()> {
    let output = Command::new(program).args(version_args).output();

    match output {
        Ok(output) if output.status.success() => {
            debug!(
                tool = program,
                version = %String::from_utf8_lossy(&output.stdout).trim(),
                "Found tool"
            );
            Ok(())
        }
        _ => Err(PublishError::MissingTool {
            tool: program.to_string(),
        }
        .into()),
    }
}

/// Validates that the `git` CLI is available for clone, fetch and push.
pub fn check_git_cli() -> Result<()> {
    check_tool("git", &["--version"])
}

/// Validates that the render program can run `nbconvert`.
pub fn check_render_tool(program: &str) -> Result<()> {
    check_tool(program, &["nbconvert", "--version"])
}

/// Validates everything `publish` needs before it starts.
pub fn check_publish_prerequisites(render_program: Option<&str>) -> Result<()> {
    check_git_cli()?;
    if let Some(program) = render_program {
        check_render_tool(program)?;
    }
    Ok(())
}
