//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Draft commands.
#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Show the saved draft
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set one field of the saved draft
    Set {
        /// Field name, e.g. fullName or dateOfBirth
        field: String,

        /// New value (YYYY-MM-DD for dates, comma-separated hobbies)
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Validate the saved draft without submitting
    Validate,

    /// Delete the saved draft
    Clear,
}

/// Submitted form commands.
#[derive(Debug, Subcommand)]
pub enum SubmissionsCommand {
    /// List submitted forms, oldest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Image commands.
#[derive(Debug, Subcommand)]
pub enum ImagesCommand {
    /// Copy image files into the image directory
    Save {
        /// Files to save
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// List saved images
    List,

    /// Delete one saved image
    Delete {
        /// Image file name or path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete every saved image
    Clear,

    /// Show the total size of saved images
    Size,
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
