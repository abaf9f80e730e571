//! Bulk loading module for sqly
//!
//! This module copies flat files into the shared relational store:
//!
//! 1. Every input path is expanded (directories contribute their files)
//! 2. Each file is staged into a private store that infers column types
//! 3. Each staged table replaces any same-named table in the shared store,
//!    reusing the staged schema verbatim so inferred types survive
//! 4. Rows are streamed across in source order, committing every batch
//!
//! Tables commit independently. If copying one table fails, only its
//! in-flight batch is rolled back; tables copied before it stay in place.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::config::AppConfig;
use crate::error::{SqlyError, SqlyResult, StoreOp};
use crate::file_handler::expand_paths;
use crate::staging::Staging;
use crate::store::sqlite::{column_names, user_table_names};
use crate::store::{quote_identifier, SqliteStore};

/// Rows copied per transaction unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Outcome of copying one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    /// Name of the table in the shared store
    pub name: String,
    /// File the table came from
    pub source: PathBuf,
    /// Rows copied
    pub rows: usize,
    /// Transactions committed while copying
    pub batches: usize,
}

/// Outcome of one bulk load, in copy order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    tables: Vec<TableLoad>,
}

impl LoadReport {
    /// Every table copied, in copy order
    pub fn tables(&self) -> &[TableLoad] {
        &self.tables
    }

    /// Look up a copied table by name
    pub fn table(&self, name: &str) -> Option<&TableLoad> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Total rows copied across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|table| table.rows).sum()
    }
}

/// Copies files into a SQLite store with batched transactions
#[derive(Debug, Clone)]
pub struct BulkLoader {
    /// Rows per committed transaction
    batch_size: usize,
    /// Optional cancellation, observed at batch boundaries
    cancellation: Option<CancellationToken>,
    /// Sheet selected from workbooks
    sheet: Option<String>,
}

impl BulkLoader {
    /// Create a loader using the configured batch size
    pub fn new(config: &AppConfig) -> Self {
        BulkLoader {
            batch_size: config.batch_size(),
            cancellation: None,
            sheet: config.sheet().map(str::to_string),
        }
    }

    /// Override the batch size; zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Observe the given token at every batch boundary
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Load files and directories into the store
    ///
    /// # Arguments
    /// * `store` - Shared store that receives the tables
    /// * `paths` - Files (optionally compressed) or directories
    ///
    /// # Returns
    /// * `Ok(LoadReport)` describing every table copied
    /// * `Err` on the first failure; tables copied before it remain stored
    pub fn load<P: AsRef<Path>>(
        &self,
        store: &mut SqliteStore,
        paths: &[P],
    ) -> SqlyResult<LoadReport> {
        let mut report = LoadReport::default();
        for path in expand_paths(paths)? {
            self.load_file(store, &path, &mut report)?;
        }
        Ok(report)
    }

    fn load_file(
        &self,
        store: &mut SqliteStore,
        path: &Path,
        report: &mut LoadReport,
    ) -> SqlyResult<()> {
        let mut staging = Staging::new()?;
        staging.stage_file(path, self.sheet.as_deref())?;

        for name in user_table_names(staging.connection())? {
            let (rows, batches) = self
                .copy_table(staging.connection(), store.connection_mut(), &name)
                .map_err(|e| copy_error(&name, None, e))?;
            info!(table = %name, rows, batches, source = %path.display(), "table loaded");
            report.tables.push(TableLoad {
                name,
                source: path.to_path_buf(),
                rows,
                batches,
            });
        }
        Ok(())
    }

    /// Replace `name` in `dest` with the staged table and copy its rows
    ///
    /// # Returns
    /// * `Ok((rows, batches))` - Rows copied and transactions committed
    fn copy_table(
        &self,
        staging: &Connection,
        dest: &mut Connection,
        name: &str,
    ) -> SqlyResult<(usize, usize)> {
        let quoted = quote_identifier(name);

        dest.execute(&format!("DROP TABLE IF EXISTS {quoted}"), [])
            .map_err(|e| SqlyError::store(StoreOp::DropTable, e))?;

        let schema: String = staging
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SqlyError::store(StoreOp::Schema, e))?
            .ok_or(SqlyError::NoRows)?;
        dest.execute(&schema, [])
            .map_err(|e| SqlyError::store(StoreOp::CreateTable, e))?;

        let columns = column_names(staging, name, StoreOp::Columns)?;
        validate_columns(name, &columns)?;

        let column_list = columns
            .iter()
            .map(|column| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let insert_sql = format!("INSERT INTO {quoted} ({column_list}) VALUES ({placeholders})");
        let select_sql = format!("SELECT {column_list} FROM {quoted} ORDER BY rowid");

        let mut select = staging
            .prepare(&select_sql)
            .map_err(|e| SqlyError::store(StoreOp::Query, e))?;
        let mut rows = select
            .query([])
            .map_err(|e| SqlyError::store(StoreOp::Query, e))?;

        let mut copied = 0;
        let mut batches = 0;
        let mut exhausted = false;
        while !exhausted {
            if self.is_cancelled() {
                info!(table = %name, rows = copied, "load cancelled");
                return Err(SqlyError::Cancelled);
            }

            let tx = dest
                .transaction()
                .map_err(|e| SqlyError::store(StoreOp::Begin, e))?;
            let mut in_batch = 0;
            {
                let mut insert = tx
                    .prepare(&insert_sql)
                    .map_err(|e| SqlyError::store(StoreOp::Prepare, e))?;
                while in_batch < self.batch_size {
                    let row_number = copied + in_batch + 1;
                    let row = rows.next().map_err(|e| {
                        copy_error(name, Some(row_number), SqlyError::store(StoreOp::Query, e))
                    })?;
                    let Some(row) = row else {
                        exhausted = true;
                        break;
                    };

                    let values = (0..columns.len())
                        .map(|idx| row.get::<_, Value>(idx))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| {
                            copy_error(name, Some(row_number), SqlyError::store(StoreOp::Columns, e))
                        })?;
                    insert.execute(params_from_iter(values.iter())).map_err(|e| {
                        copy_error(name, Some(row_number), SqlyError::store(StoreOp::Insert, e))
                    })?;
                    in_batch += 1;
                }
            }

            if in_batch == 0 {
                // Nothing left; the empty transaction rolls back on drop.
                break;
            }
            tx.commit()
                .map_err(|e| SqlyError::store(StoreOp::Commit, e))?;
            copied += in_batch;
            batches += 1;
            debug!(table = %name, batch = batches, rows = in_batch, "batch committed");
        }

        Ok((copied, batches))
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .map(CancellationToken::is_cancelled)
            .unwrap_or(false)
    }
}

impl Default for BulkLoader {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

/// Reject tables that have no columns or an empty column name
pub fn validate_columns(table: &str, columns: &[String]) -> SqlyResult<()> {
    if columns.is_empty() {
        return Err(SqlyError::NoColumns {
            table: table.to_string(),
        });
    }
    if columns.iter().any(|column| column.trim().is_empty()) {
        return Err(SqlyError::InvalidColumnName {
            table: table.to_string(),
        });
    }
    Ok(())
}

/// Attach the table (and row) to a copy failure, leaving cancellation and
/// already-attributed errors untouched
fn copy_error(table: &str, row: Option<usize>, err: SqlyError) -> SqlyError {
    match err {
        SqlyError::Copy { .. } | SqlyError::Cancelled => err,
        other => SqlyError::Copy {
            table: table.to_string(),
            row,
            source: Box::new(other),
        },
    }
}
