//! Utility functions and helpers.

pub mod preflight;
pub mod settings;

pub use preflight::{check_git_cli, check_publish_prerequisites, check_render_tool, check_tool};
pub use settings::Settings;
