//! Table module for sqly
//!
//! This module provides the canonical in-memory relation that every file
//! adapter produces and every query returns. A table is a plain value:
//!
//! - a name (derived from the source file or generated for query results)
//! - an ordered header of column names
//! - a sequence of records, each an ordered sequence of string cells
//!
//! Records are not required to match the header length; the relational
//! store's own column binding rejects mismatched rows when they are inserted.

use rand::Rng;

use crate::error::{SqlyError, SqlyResult};

/// Prefix reserved for the names of ephemeral query-result tables
///
/// Names starting with this prefix are never listed as user tables.
pub const RESULT_TABLE_PREFIX: &str = "sqly_result_";

/// Represents a single row of string cells
pub type Record = Vec<String>;

/// Represents an in-memory table
///
/// Equality is structural: two tables are equal when they share the same
/// name, the same header in the same order and the same records in the same
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Name of the table
    name: String,

    /// Column names, in order
    header: Vec<String>,

    /// Rows of data
    records: Vec<Record>,
}

impl Table {
    /// Create a new table with the given name, header and records
    pub fn new(name: impl Into<String>, header: Vec<String>, records: Vec<Record>) -> Self {
        Table {
            name: name.into(),
            header,
            records,
        }
    }

    /// Create a query-result table whose name cannot collide with user tables
    ///
    /// The name is [`RESULT_TABLE_PREFIX`] followed by 16 random hex digits.
    pub fn ephemeral(header: Vec<String>, records: Vec<Record>) -> Self {
        Table::new(ephemeral_name(), header, records)
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column names
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Get all records
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Get the number of records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds a generated query-result name
    pub fn is_ephemeral(&self) -> bool {
        is_ephemeral_name(&self.name)
    }

    /// Replace the table name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the header
    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    /// Append one record
    ///
    /// Used by adapters while they accumulate rows during parsing.
    pub fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Check whether the table can be persisted
    ///
    /// Checks run in a fixed order: name, then header, then records.
    ///
    /// # Returns
    /// * `Ok(())` if the table has a name, a header and at least one record
    /// * `Err(SqlyError::EmptyTableName)` if the name is empty
    /// * `Err(SqlyError::EmptyHeader)` if the header is empty
    /// * `Err(SqlyError::EmptyRecords)` if there are no records
    pub fn valid(&self) -> SqlyResult<()> {
        if self.name.is_empty() {
            return Err(SqlyError::EmptyTableName);
        }
        if self.header.is_empty() {
            return Err(SqlyError::EmptyHeader);
        }
        if self.records.is_empty() {
            return Err(SqlyError::EmptyRecords);
        }
        Ok(())
    }
}

/// Whether a table name was produced by [`Table::ephemeral`]
pub fn is_ephemeral_name(name: &str) -> bool {
    name.starts_with(RESULT_TABLE_PREFIX)
}

fn ephemeral_name() -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!("{RESULT_TABLE_PREFIX}{suffix:016x}")
}
