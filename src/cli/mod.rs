//! CLI module for insightq
//!
//! Provides command-line interface for:
//! - query: One-shot query evaluation (stdin -> stdout)
//! - list: List the loaded datasets

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    execute_list, execute_query, list, load_records, query, run, run_command, Config,
    DatasetConfig,
};
pub use errors::{CliError, CliResult};
pub use io::{read_request, write_error, write_response};
