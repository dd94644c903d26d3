//! CLI argument definitions using clap
//!
//! Commands:
//! - insightq query --config <path>
//! - insightq list --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// insightq - Query course and room datasets with JSON queries
#[derive(Parser, Debug)]
#[command(name = "insightq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate one query read from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./insightq.json")]
        config: PathBuf,
    },

    /// List the configured datasets and exit
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./insightq.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
