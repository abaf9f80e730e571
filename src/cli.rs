//! CLI argument parsing module for sqly
//!
//! This module handles parsing command-line arguments using the clap crate.
//! It defines the command-line interface structure and behavior for the application,
//! enabling users to specify input files, SQL statements, and output options.
//!
//! Key features of the CLI:
//! - Any number of input files or directories, loaded in the order given
//! - Support for multiple SQL statements in a single invocation
//! - Query results printed in a chosen text mode or written to a file
//! - Table listing and header inspection without writing SQL

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::config::{AppConfig, OutputMode};

/// Command-line arguments for sqly
///
/// This struct represents all configurable aspects of the application through
/// command-line parameters. It is automatically populated by clap based on
/// the provided arguments.
#[derive(Parser, Debug)]
#[clap(
    name = "sqly",
    author,
    version,
    about = "Run SQL against CSV, TSV, LTSV, JSON and spreadsheet files"
)]
pub struct SqlyArgs {
    /// Input files or directories
    ///
    /// Every file becomes a table named after the file without its
    /// extensions. A workbook becomes one table per sheet. Compressed files
    /// (.gz, .bz2, .xz, .zst) are decoded transparently.
    #[clap(help = "Input files or directories to load")]
    pub files: Vec<PathBuf>,

    /// SQL statements to execute
    ///
    /// Statements run in the order given, each seeing the effects of the
    /// previous one. Example: -s "DELETE FROM t WHERE id = 1" -s "SELECT * FROM t"
    #[clap(short, long, help = "SQL statement to execute")]
    pub sql: Vec<String>,

    /// Write query results to this file instead of stdout
    ///
    /// The format is chosen by the extension: .csv, .tsv, .ltsv, .json or .xlsx.
    #[clap(short, long, value_name = "FILE", help = "Write query results to a file")]
    pub output: Option<PathBuf>,

    /// Format used when printing results to stdout
    #[clap(short, long, value_enum, default_value = "csv", help = "Output mode for stdout")]
    pub mode: ModeArg,

    /// Load only this sheet from spreadsheet inputs
    #[clap(long, value_name = "NAME", help = "Sheet to load from workbooks")]
    pub sheet: Option<String>,

    /// List the loaded tables and their columns
    #[clap(long, help = "List tables and their columns")]
    pub tables: bool,

    /// Print the header of one table
    #[clap(long, value_name = "TABLE", help = "Print the header of a table")]
    pub header: Option<String>,

    /// Rows copied per transaction while loading
    #[clap(long, default_value_t = crate::loader::DEFAULT_BATCH_SIZE, help = "Rows per load transaction")]
    pub batch_size: usize,

    /// Keep the tables in this database file instead of memory
    #[clap(long, value_name = "FILE", help = "SQLite database file to load into")]
    pub database: Option<PathBuf>,

    /// Enable verbose diagnostic output
    #[clap(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Output mode argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Labeled tab-separated values
    Ltsv,
    /// Array of JSON objects
    Json,
}

impl From<ModeArg> for OutputMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Csv => OutputMode::Csv,
            ModeArg::Tsv => OutputMode::Tsv,
            ModeArg::Ltsv => OutputMode::Ltsv,
            ModeArg::Json => OutputMode::Json,
        }
    }
}

impl SqlyArgs {
    /// Build the application configuration from the parsed arguments
    pub fn to_config(&self) -> AppConfig {
        AppConfig::new(self.verbose, self.mode.into(), self.output.clone())
            .with_batch_size(self.batch_size)
            .with_database(self.database.clone())
            .with_sheet(self.sheet.clone())
    }
}

/// Parse command-line arguments into the SqlyArgs structure
///
/// # Returns
/// * `Ok(SqlyArgs)` - Command-line arguments successfully parsed
/// * `Err` - Error during argument parsing (handled by clap, usually results in help text display)
pub fn parse_args() -> Result<SqlyArgs> {
    Ok(SqlyArgs::parse())
}
