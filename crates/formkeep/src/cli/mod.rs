//! Command-line interface for formkeep.
//!
//! This module provides the CLI structure for the `formkeep` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DraftCommand, ImagesCommand, ResetCommand, StatusCommand, SubmissionsCommand,
};

/// formkeep - Fill in, validate and keep signup forms
///
/// Edits a persisted signup draft field by field, validates and submits it,
/// and keeps captured images in an application-owned directory.
#[derive(Debug, Parser)]
#[command(name = "formkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show saved draft, submission and image totals
    Status(StatusCommand),

    /// Inspect or edit the saved draft
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Validate the saved draft and submit it
    Submit,

    /// Inspect submitted forms
    #[command(subcommand)]
    Submissions(SubmissionsCommand),

    /// Manage saved images
    #[command(subcommand)]
    Images(ImagesCommand),

    /// Delete the draft, all submissions and all images
    Reset(ResetCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "formkeep");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["formkeep", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["formkeep", "-v", "status"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["formkeep", "-vv", "status"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["formkeep", "-q", "-v", "status"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["formkeep", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_status_json() {
        let cli = parse(&["formkeep", "status", "--json"]);
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_draft_set() {
        let cli = parse(&["formkeep", "draft", "set", "fullName", "Ada Lovelace"]);
        let Command::Draft(DraftCommand::Set { field, value }) = cli.command else {
            panic!("expected draft set");
        };
        assert_eq!(field, "fullName");
        assert_eq!(value, "Ada Lovelace");
    }

    #[test]
    fn test_parse_draft_set_allows_empty_value() {
        let cli = parse(&["formkeep", "draft", "set", "dateOfBirth", ""]);
        assert!(matches!(cli.command, Command::Draft(DraftCommand::Set { .. })));
    }

    #[test]
    fn test_parse_submit() {
        assert!(matches!(parse(&["formkeep", "submit"]).command, Command::Submit));
    }

    #[test]
    fn test_parse_images_save_many() {
        let cli = parse(&["formkeep", "images", "save", "a.jpg", "b.jpg"]);
        let Command::Images(ImagesCommand::Save { files }) = cli.command else {
            panic!("expected images save");
        };
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_images_save_requires_files() {
        assert!(Cli::try_parse_from(["formkeep", "images", "save"]).is_err());
    }

    #[test]
    fn test_parse_reset() {
        let cli = parse(&["formkeep", "reset", "--yes"]);
        assert!(matches!(cli.command, Command::Reset(ResetCommand { yes: true })));
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(Cli::try_parse_from(["formkeep", "daemon", "start"]).is_err());
    }
}
