//! SQL statement routing for sqly
//!
//! The executor decides, from a statement's leading keyword, whether it is a
//! query that returns rows, a statement that modifies rows, or something sqly
//! refuses to run. Checks happen in a fixed order:
//!
//! 1. DDL, TCL and DCL statements are rejected before reaching the store
//! 2. Anything that is not DML is rejected as not being SQL at all
//! 3. Input holding more than one statement is rejected
//! 4. SELECT, EXPLAIN and WITH run as queries and yield a table
//! 5. INSERT, UPDATE and DELETE run as statements and yield a row count

use tracing::debug;

use crate::classifier::{has_trailing_statement, Category, LeadingKeyword};
use crate::error::{SqlyError, SqlyResult};
use crate::store::Store;
use crate::table::Table;

/// Result of a successfully routed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Rows returned by a query
    Rows(Table),
    /// Number of rows changed by a statement
    Affected(u64),
}

impl ExecOutcome {
    /// Result table, for queries
    pub fn table(&self) -> Option<&Table> {
        match self {
            ExecOutcome::Rows(table) => Some(table),
            ExecOutcome::Affected(_) => None,
        }
    }

    /// Affected row count; zero for queries
    pub fn affected_rows(&self) -> u64 {
        match self {
            ExecOutcome::Rows(_) => 0,
            ExecOutcome::Affected(count) => *count,
        }
    }
}

/// SQL statement executor over a relational store
pub struct SqlExecutor<S: Store> {
    store: S,
}

impl<S: Store> SqlExecutor<S> {
    /// Create a new executor that owns the given store
    pub fn new(store: S) -> Self {
        SqlExecutor { store }
    }

    /// Get a reference to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Route and execute one SQL statement
    ///
    /// # Arguments
    /// * `sql` - Raw statement text as typed by the user
    ///
    /// # Returns
    /// * `Ok(ExecOutcome::Rows)` for SELECT, EXPLAIN and WITH
    /// * `Ok(ExecOutcome::Affected)` for INSERT, UPDATE and DELETE
    /// * `Err(SqlyError::Unsupported)` for DDL, TCL and DCL
    /// * `Err(SqlyError::NotSqlQuery)` for anything else
    /// * `Err(SqlyError::MultipleStatements)` if a second statement follows
    /// * `Err(SqlyError::Execution)` if the store fails
    pub fn exec_sql(&mut self, sql: &str) -> SqlyResult<ExecOutcome> {
        let statement = sql.trim();
        let keyword = LeadingKeyword::of(statement);
        debug!(keyword = keyword.as_str(), "routing statement");

        if keyword.is_ddl() {
            return Err(unsupported(Category::Ddl));
        }
        if keyword.is_tcl() {
            return Err(unsupported(Category::Tcl));
        }
        if keyword.is_dcl() {
            return Err(unsupported(Category::Dcl));
        }
        if !keyword.is_dml() {
            return Err(SqlyError::NotSqlQuery(sql.to_string()));
        }
        if has_trailing_statement(statement) {
            return Err(SqlyError::MultipleStatements(statement.to_string()));
        }

        if keyword.is_select() || keyword.is_explain() || keyword.is_with_cte() {
            self.store
                .query(statement)
                .map(ExecOutcome::Rows)
                .map_err(|e| execution_error("execute query", statement, e))
        } else if keyword.is_insert() || keyword.is_update() || keyword.is_delete() {
            self.store
                .exec(statement)
                .map(ExecOutcome::Affected)
                .map_err(|e| execution_error("execute statement", statement, e))
        } else {
            Err(SqlyError::Bug(format!(
                "DML keyword '{}' has no execution path",
                keyword.as_str()
            )))
        }
    }
}

fn unsupported(category: Category) -> SqlyError {
    SqlyError::Unsupported {
        language: category.language(),
        keywords: category.keywords().join(", "),
    }
}

fn execution_error(op: &'static str, sql: &str, source: SqlyError) -> SqlyError {
    SqlyError::Execution {
        op,
        sql: sql.to_string(),
        source: Box::new(source),
    }
}
