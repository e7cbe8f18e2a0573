use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gamedeck")]
#[command(author, version, about = "Game library metadata scanner")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "silent")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub silent: bool,

    /// Keep configuration and list files next to the executable
    #[arg(long, global = true)]
    pub portable: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan game directories and print the resulting catalog
    Scan {
        /// Game directories to scan instead of the configured ones
        dirs: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Descend into subdirectories when expanding collection filters
        #[arg(short, long)]
        recursive: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
