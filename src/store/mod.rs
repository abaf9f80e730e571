//! Relational store interface for sqly
//!
//! This module defines the operations the rest of sqly needs from an
//! embedded SQL engine. By going through the [`Store`] trait, the statement
//! router can run against SQLite or against any other engine (or a test
//! double) without changes.

pub(crate) mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::SqlyResult;
use crate::table::Table;

/// Common interface for relational stores
///
/// Every method blocks until the engine answers. Callers that share one
/// store must serialize their own calls.
pub trait Store {
    /// Create an empty table with one text column per header entry
    ///
    /// # Arguments
    /// * `table` - Table whose name and header define the new table
    ///
    /// # Returns
    /// * `Ok(())` if the table was created
    /// * `Err` if the table is not valid or the engine rejects it
    fn create_table(&mut self, table: &Table) -> SqlyResult<()>;

    /// Insert every record of a table into the same-named store table
    ///
    /// All records are inserted inside one transaction.
    fn insert(&mut self, table: &Table) -> SqlyResult<()>;

    /// Run a statement that returns rows and materialize them
    ///
    /// # Returns
    /// * `Ok(Table)` with an ephemeral name, the result columns as header
    ///   and every cell converted to text
    fn query(&self, sql: &str) -> SqlyResult<Table>;

    /// Run a statement that modifies data
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of rows affected
    fn exec(&mut self, sql: &str) -> SqlyResult<u64>;

    /// List user tables, each with its header and no records
    fn tables_name(&self) -> SqlyResult<Vec<Table>>;

    /// Get the header of one table
    ///
    /// # Returns
    /// * `Ok(Table)` with the table name, its header and no records
    /// * `Err(SqlyError::NoRows)` if the table does not exist
    fn header(&self, table_name: &str) -> SqlyResult<Table>;
}

/// Quote an identifier for use in generated SQL
///
/// The name is wrapped in double quotes and embedded double quotes are
/// doubled, so reserved words and special characters stay safe:
/// `foo"bar` becomes `"foo""bar"`.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("foo\"bar"), "\"foo\"\"bar\"");
        assert_eq!(quote_identifier("Select"), "\"Select\"");
        assert_eq!(quote_identifier(""), "\"\"");
        assert_eq!(quote_identifier("a b"), "\"a b\"");
    }
}
