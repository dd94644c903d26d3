//! CLI command implementations
//!
//! Each command loads the config, installs logging, loads the configured
//! datasets into memory and answers exactly one request.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::dataset::{is_valid_dataset_id, DatasetError, DatasetResult, DatasetStore, Record};
use crate::executor::QueryEngine;
use crate::observability::{init_logging, LogFormat, DEFAULT_LOG_LEVEL};
use crate::schema::DatasetKind;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// One dataset to load at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Dataset id used as the key prefix in queries
    pub id: String,
    pub kind: DatasetKind,
    /// JSON array of flat records. Relative paths resolve against the config file.
    pub path: PathBuf,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Datasets to load (optional, default none)
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,

    /// Log filter used when RUST_LOG is unset (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "text" or "json" (optional, default "text")
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Directory of the config file
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_log_format() -> String {
    LogFormat::Text.as_str().to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if LogFormat::parse(&self.log_format).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_format: '{}'. Expected 'text' or 'json'.",
                self.log_format
            )));
        }

        let mut seen = HashSet::new();
        for dataset in &self.datasets {
            if !is_valid_dataset_id(&dataset.id) {
                return Err(CliError::config_error(format!(
                    "Invalid dataset id: '{}'",
                    dataset.id
                )));
            }
            if !seen.insert(dataset.id.as_str()) {
                return Err(CliError::config_error(format!(
                    "Duplicate dataset id: '{}'",
                    dataset.id
                )));
            }
        }

        Ok(())
    }

    /// Returns the parsed log format
    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.log_format).unwrap_or_default()
    }

    /// Resolves a dataset path against the config file's directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Loads every configured dataset into a fresh store
    pub fn load_store(&self) -> CliResult<DatasetStore> {
        let mut store = DatasetStore::new();

        for dataset in &self.datasets {
            let records = load_records(&self.resolve_path(&dataset.path))?;
            store.add(&dataset.id, dataset.kind, records)?;
        }

        debug!(datasets = store.len(), "datasets loaded");
        Ok(store)
    }
}

/// Reads a JSON array of flat records
pub fn load_records(path: &Path) -> DatasetResult<Vec<Record>> {
    let display = path.display().to_string();

    let content =
        fs::read_to_string(path).map_err(|e| DatasetError::load(&display, e.to_string()))?;

    serde_json::from_str(&content).map_err(|e| DatasetError::load(&display, e.to_string()))
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run a CLI command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { config } => query(&config),
        Command::List { config } => list(&config),
    }
}

/// Evaluates one query from stdin, writing the response to stdout
pub fn query(config_path: &Path) -> CliResult<()> {
    let config = prepare(config_path)?;
    execute_query(&config, &mut io::stdin().lock(), &mut io::stdout().lock())
}

/// Writes the dataset list to stdout
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = prepare(config_path)?;
    execute_list(&config, &mut io::stdout().lock())
}

/// Evaluates one query read from `input`.
///
/// A rejected query is a response, not a failure: it is written as an
/// error envelope and this returns Ok.
pub fn execute_query<R: Read, W: Write>(
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> CliResult<()> {
    let store = config.load_store()?;
    let request = read_request(input)?;

    match QueryEngine::new(&store).evaluate(&request) {
        Ok(rows) => write_response(output, serde_json::to_value(rows)?),
        Err(err) => write_error(output, err.code(), &err.to_string()),
    }
}

/// Writes `{id, kind, numRows}` for every loaded dataset
pub fn execute_list<W: Write>(config: &Config, output: &mut W) -> CliResult<()> {
    let store = config.load_store()?;
    let data: Value = serde_json::to_value(store.list())?;
    write_response(output, data)
}

fn prepare(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    init_logging(&config.log_level, config.log_format());
    Ok(config)
}
