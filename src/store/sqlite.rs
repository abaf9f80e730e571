//! SQLite implementation of the relational store
//!
//! Wraps a single rusqlite connection. Every engine failure is tagged with
//! the store operation that raised it.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use super::{quote_identifier, Store};
use crate::config::AppConfig;
use crate::error::{SqlyError, SqlyResult, StoreOp};
use crate::table::{is_ephemeral_name, Record, Table};

/// Relational store backed by an embedded SQLite database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a private in-memory database
    pub fn open_in_memory() -> SqlyResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| SqlyError::store(StoreOp::Exec, e))?;
        Ok(SqliteStore { conn })
    }

    /// Open (or create) a database file
    pub fn open(path: &Path) -> SqlyResult<Self> {
        let conn = Connection::open(path).map_err(|e| SqlyError::store(StoreOp::Exec, e))?;
        Ok(SqliteStore { conn })
    }

    /// Open the database selected by the configuration
    pub fn from_config(config: &AppConfig) -> SqlyResult<Self> {
        match config.database() {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Store for SqliteStore {
    fn create_table(&mut self, table: &Table) -> SqlyResult<()> {
        table.valid()?;

        let columns = table
            .header()
            .iter()
            .map(|column| format!("{} TEXT", quote_identifier(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("CREATE TABLE {} ({columns})", quote_identifier(table.name()));
        debug!(%sql, "creating table");

        self.conn
            .execute(&sql, [])
            .map_err(|e| SqlyError::store(StoreOp::CreateTable, e))?;
        Ok(())
    }

    fn insert(&mut self, table: &Table) -> SqlyResult<()> {
        table.valid()?;

        let placeholders = vec!["?"; table.header().len()].join(", ");
        let sql = format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_identifier(table.name())
        );

        let tx = self
            .conn
            .transaction()
            .map_err(|e| SqlyError::store(StoreOp::Begin, e))?;
        {
            let mut stmt = tx
                .prepare(&sql)
                .map_err(|e| SqlyError::store(StoreOp::Prepare, e))?;
            for record in table.records() {
                stmt.execute(params_from_iter(record.iter()))
                    .map_err(|e| SqlyError::store(StoreOp::Insert, e))?;
            }
        }
        tx.commit().map_err(|e| SqlyError::store(StoreOp::Commit, e))?;

        debug!(table = table.name(), rows = table.record_count(), "inserted records");
        Ok(())
    }

    fn query(&self, sql: &str) -> SqlyResult<Table> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| SqlyError::store(StoreOp::Query, e))?;
        let header: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = header.len();

        let mut rows = stmt
            .query([])
            .map_err(|e| SqlyError::store(StoreOp::Query, e))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(|e| SqlyError::store(StoreOp::Query, e))? {
            let mut record: Record = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| SqlyError::store(StoreOp::Columns, e))?;
                record.push(cell_text(value));
            }
            records.push(record);
        }

        Ok(Table::ephemeral(header, records))
    }

    fn exec(&mut self, sql: &str) -> SqlyResult<u64> {
        let affected = self
            .conn
            .execute(sql, [])
            .map_err(|e| SqlyError::store(StoreOp::Exec, e))?;
        Ok(affected as u64)
    }

    fn tables_name(&self) -> SqlyResult<Vec<Table>> {
        let names = user_table_names(&self.conn)?;
        names
            .into_iter()
            .filter(|name| !is_ephemeral_name(name))
            .map(|name| self.header(&name))
            .collect()
    }

    fn header(&self, table_name: &str) -> SqlyResult<Table> {
        let columns = column_names(&self.conn, table_name, StoreOp::Header)?;
        if columns.is_empty() {
            return Err(SqlyError::NoRows);
        }
        Ok(Table::new(table_name, columns, Vec::new()))
    }
}

/// Convert an engine value to its text form
///
/// Text and blobs decode as UTF-8, numbers print in decimal and NULL
/// becomes an empty string.
pub(crate) fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Names of the user tables of a connection, in creation order
///
/// SQLite's internal `sqlite_*` tables are excluded.
pub(crate) fn user_table_names(conn: &Connection) -> SqlyResult<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
        )
        .map_err(|e| SqlyError::store(StoreOp::GetTables, e))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| SqlyError::store(StoreOp::GetTables, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SqlyError::store(StoreOp::GetTables, e))?;
    Ok(names)
}

/// Column names of one table, in declaration order
///
/// Failures are tagged with `op`.
pub(crate) fn column_names(
    conn: &Connection,
    table_name: &str,
    op: StoreOp,
) -> SqlyResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(|e| SqlyError::store(op, e))?;
    let names = stmt
        .query_map([table_name], |row| row.get::<_, String>(0))
        .map_err(|e| SqlyError::store(op, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SqlyError::store(op, e))?;
    Ok(names)
}
