//! Error handling for sqly
//!
//! This module defines the closed set of errors that can occur while reading
//! flat files, loading them into the relational store and executing SQL.
//! Variants fall into a few groups:
//!
//! - Sentinels that callers match on (`EmptyTableName`, `NoLabel`, `NoRows`, ...)
//! - Format errors raised by the file adapters (`Csv`, `Json`, `Spreadsheet`, `Io`)
//! - Store errors tagged with the operation that failed (`Store`)
//! - Copy errors tagged with the table (and row) being copied (`Copy`)
//! - Statement routing errors (`Unsupported`, `NotSqlQuery`, `Execution`)
//! - Internal invariant violations (`Bug`), which are never user mistakes
//!
//! The module uses thiserror so every variant carries a readable message
//! while staying matchable by kind.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Operation tag attached to every relational store failure
///
/// The tag names the store call that failed so that a message such as
/// `query: no such table: users` can be traced back to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    CreateTable,
    Insert,
    Query,
    Exec,
    Columns,
    GetTables,
    Header,
    Schema,
    Begin,
    Commit,
    Prepare,
    DropTable,
    Staging,
}

impl StoreOp {
    /// Short, stable name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::CreateTable => "create_table",
            StoreOp::Insert => "insert",
            StoreOp::Query => "query",
            StoreOp::Exec => "exec",
            StoreOp::Columns => "columns",
            StoreOp::GetTables => "get_tables",
            StoreOp::Header => "header",
            StoreOp::Schema => "schema",
            StoreOp::Begin => "begin",
            StoreOp::Commit => "commit",
            StoreOp::Prepare => "prepare",
            StoreOp::DropTable => "drop_table",
            StoreOp::Staging => "staging",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SqlyError represents all possible errors raised by the sqly library
#[derive(Error, Debug)]
pub enum SqlyError {
    /// A table without a name cannot be persisted
    #[error("table name is empty")]
    EmptyTableName,

    /// A table without columns cannot be persisted
    #[error("header is empty")]
    EmptyHeader,

    /// A table without rows cannot be persisted
    #[error("records is empty")]
    EmptyRecords,

    /// An LTSV field had no `label:` prefix
    #[error("LTSV field has no label")]
    NoLabel,

    /// The store returned no rows where at least one was required
    #[error("no rows in result set")]
    NoRows,

    /// Failure inside the embedded relational engine
    #[error("{op}: {source}")]
    Store {
        op: StoreOp,
        #[source]
        source: rusqlite::Error,
    },

    /// Failure while copying a staged table into the shared store
    #[error(
        "failed to copy table '{table}'{}: {source}",
        .row.map(|row| format!(" at row {row}")).unwrap_or_default()
    )]
    Copy {
        table: String,
        row: Option<usize>,
        #[source]
        source: Box<SqlyError>,
    },

    /// A staged table carried an empty or whitespace-only column name
    #[error("table '{table}' has an empty column name")]
    InvalidColumnName { table: String },

    /// A staged table carried no columns at all
    #[error("table '{table}' has no columns")]
    NoColumns { table: String },

    /// Statement belongs to a keyword category that is deliberately refused
    #[error("not support {language} ({keywords})")]
    Unsupported {
        language: &'static str,
        keywords: String,
    },

    /// Statement does not start with any recognised SQL keyword
    #[error("this input is not sql query or sqly helper command: {0}")]
    NotSqlQuery(String),

    /// Input carried more than one statement
    #[error("only one sql statement can be executed at a time: {0}")]
    MultipleStatements(String),

    /// A routed statement failed inside the store
    #[error("{op} error: {sql}: {source}")]
    Execution {
        op: &'static str,
        sql: String,
        #[source]
        source: Box<SqlyError>,
    },

    /// Internal invariant violation; indicates a defect in sqly itself
    #[error("sqly internal error, please report this bug: {0}")]
    Bug(String),

    /// The caller cancelled a long-running load
    #[error("operation cancelled")]
    Cancelled,

    /// The file extension does not map to a supported format
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Error during file system operations (reading/writing files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while parsing or writing delimited file data
    #[error("delimited file error: {0}")]
    Csv(#[from] csv::Error),

    /// Error while decoding or encoding JSON data
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error while reading a spreadsheet
    #[error("spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    /// Error while writing a spreadsheet
    #[error("spreadsheet write error: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),
}

impl SqlyError {
    /// Wrap an engine error with the operation that produced it
    pub fn store(op: StoreOp, source: rusqlite::Error) -> Self {
        SqlyError::Store { op, source }
    }

    /// Operation tag, when this is a store error
    pub fn store_op(&self) -> Option<StoreOp> {
        match self {
            SqlyError::Store { op, .. } => Some(*op),
            SqlyError::Execution { source, .. } | SqlyError::Copy { source, .. } => {
                source.store_op()
            }
            _ => None,
        }
    }
}

/// Result type alias for operations that can produce a SqlyError
pub type SqlyResult<T> = std::result::Result<T, SqlyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_message_carries_operation() {
        let err = SqlyError::store(StoreOp::GetTables, rusqlite::Error::InvalidQuery);
        assert!(err.to_string().starts_with("get_tables: "));
        assert_eq!(err.store_op(), Some(StoreOp::GetTables));
    }

    #[test]
    fn test_copy_error_mentions_table_and_row() {
        let err = SqlyError::Copy {
            table: "users".to_string(),
            row: Some(42),
            source: Box::new(SqlyError::NoRows),
        };
        let message = err.to_string();
        assert!(message.contains("'users'"));
        assert!(message.contains("at row 42"));

        let without_row = SqlyError::Copy {
            table: "users".to_string(),
            row: None,
            source: Box::new(SqlyError::NoRows),
        };
        assert!(!without_row.to_string().contains("at row"));
    }

    #[test]
    fn test_execution_error_reaches_store_op() {
        let err = SqlyError::Execution {
            op: "execute query",
            sql: "SELECT 1".to_string(),
            source: Box::new(SqlyError::store(StoreOp::Query, rusqlite::Error::InvalidQuery)),
        };
        assert_eq!(err.store_op(), Some(StoreOp::Query));
        assert!(err.to_string().contains("SELECT 1"));
    }
}
