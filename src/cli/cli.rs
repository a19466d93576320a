use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Browse and edit a directory of plain-text notes")]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// The notes directory, defaults to `.notes` in the home directory
    #[clap(long, short, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Paths are resolved against the notes directory unless absolute.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the whole notes tree, directories first
    Tree,
    /// List the direct children of a directory
    Ls { path: Option<PathBuf> },
    Stat { path: PathBuf },
    Cat { path: PathBuf },
    /// Write stdin to a file
    Write {
        path: PathBuf,
        /// Create the file (and missing parents) if it does not exist
        #[clap(long)]
        create: bool,
        /// Replace the file if it already exists
        #[clap(long)]
        overwrite: bool,
    },
    Mkdir { path: PathBuf },
    Rm {
        path: PathBuf,
        #[clap(long, short)]
        recursive: bool,
    },
    Mv {
        old_path: PathBuf,
        new_path: PathBuf,
        #[clap(long)]
        overwrite: bool,
    },
    /// Create an empty note
    New { filename: String },
    /// Print change events until interrupted
    Watch {
        #[clap(long)]
        non_recursive: bool,
        /// Glob of paths to ignore, may be repeated
        #[clap(long = "exclude")]
        excludes: Vec<String>,
    },
}
