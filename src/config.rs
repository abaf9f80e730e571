//! Configuration module for sqly
//!
//! This module provides a centralized configuration structure for the application.
//! It is built once at startup and passed down to the components that need it,
//! rather than relying on global state or passing individual settings around.

use std::path::{Path, PathBuf};

use crate::loader::DEFAULT_BATCH_SIZE;

/// Text format used when a query result is printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values
    Tsv,
    /// Labeled tab-separated values
    Ltsv,
    /// Array of JSON objects
    Json,
}

/// Application configuration
///
/// This struct encapsulates all settings for one run of the application.
/// It is created at startup and handed to components by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Whether to show verbose output
    verbose: bool,

    /// Format used when printing results to stdout
    output_mode: OutputMode,

    /// File that query results are written to instead of stdout
    output_path: Option<PathBuf>,

    /// Rows copied per transaction when loading files
    batch_size: usize,

    /// On-disk database file; in-memory when absent
    database: Option<PathBuf>,

    /// Only this sheet is loaded from workbooks when set
    sheet: Option<String>,
}

impl AppConfig {
    /// Create a new application configuration
    ///
    /// # Arguments
    /// * `verbose` - Whether to show verbose output
    /// * `output_mode` - Format for results printed to stdout
    /// * `output_path` - Optional file that receives query results
    pub fn new(verbose: bool, output_mode: OutputMode, output_path: Option<PathBuf>) -> Self {
        Self {
            verbose,
            output_mode,
            output_path,
            batch_size: DEFAULT_BATCH_SIZE,
            database: None,
            sheet: None,
        }
    }

    /// Use a database file instead of an in-memory store
    pub fn with_database(mut self, database: Option<PathBuf>) -> Self {
        self.database = database;
        self
    }

    /// Load only the named sheet from workbooks
    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    /// Override the number of rows copied per transaction
    ///
    /// A batch size of zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Get the verbose flag
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Get the stdout output mode
    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Get the output file, if any
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Get the number of rows copied per transaction
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Get the database file, if any
    pub fn database(&self) -> Option<&Path> {
        self.database.as_deref()
    }

    /// Get the selected sheet, if any
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(false, OutputMode::default(), None)
    }
}
