//! Schema-inferring staging store for sqly
//!
//! Files are first loaded into a private in-memory SQLite database. While a
//! table is staged, each column gets the narrowest type that fits every
//! non-empty cell:
//!
//! - INTEGER when every cell is a canonical decimal integer
//! - REAL when every cell is a finite number written in canonical form
//! - TEXT otherwise, including `007`, `1.50`, `+5` and integers wider than 64 bits
//!
//! A cell is canonical when the stored number prints back as the exact
//! original text, so inference never changes the values a query returns.
//!
//! Empty cells in numeric columns are stored as NULL; text cells are stored
//! verbatim. The staged schema is later replayed against the shared store.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::{SqlyError, SqlyResult, StoreOp};
use crate::file_handler::FileHandler;
use crate::format::{detect_format, sanitize_identifier, FileFormat};
use crate::store::quote_identifier;
use crate::table::Table;

/// Storage class inferred for a staged column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Infer the type of a column from its cells
    pub fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut inferred = ColumnType::Integer;
        let mut seen = false;
        for cell in cells.filter(|cell| !cell.is_empty()) {
            seen = true;
            if inferred == ColumnType::Integer && !is_integer(cell) {
                inferred = ColumnType::Real;
            }
            if inferred == ColumnType::Real && !is_real(cell) {
                return ColumnType::Text;
            }
        }
        if seen {
            inferred
        } else {
            ColumnType::Text
        }
    }

    /// SQL type name used in the staged schema
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Convert one cell to the engine value stored for this type
    fn value(&self, cell: &str) -> Value {
        match self {
            ColumnType::Integer | ColumnType::Real if cell.is_empty() => Value::Null,
            ColumnType::Integer => cell
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnType::Real => cell
                .parse::<f64>()
                .map(Value::Real)
                .unwrap_or_else(|_| Value::Text(cell.to_string())),
            ColumnType::Text => Value::Text(cell.to_string()),
        }
    }
}

fn is_integer(cell: &str) -> bool {
    cell.parse::<i64>()
        .map(|i| i.to_string() == cell)
        .unwrap_or(false)
}

fn is_real(cell: &str) -> bool {
    cell.parse::<f64>()
        .map(|f| f.is_finite() && f.to_string() == cell)
        .unwrap_or(false)
}

/// Temporary store that holds the tables of the files being loaded
pub struct Staging {
    conn: Connection,
    file_handler: FileHandler,
}

impl Staging {
    /// Create an empty in-memory staging store
    pub fn new() -> SqlyResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| SqlyError::store(StoreOp::Staging, e))?;
        Ok(Staging {
            conn,
            file_handler: FileHandler::new(),
        })
    }

    /// Stage every table a file contains
    ///
    /// When `sheet` is set, a workbook contributes only that sheet, named
    /// after the sheet. Other formats ignore it.
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Staged table names, in file order
    pub fn stage_file(&mut self, path: &Path, sheet: Option<&str>) -> SqlyResult<Vec<String>> {
        let tables = match sheet {
            Some(sheet) if detect_format(path) == Some(FileFormat::Excel) => {
                vec![self.file_handler.read_sheet(path, sheet)?]
            }
            _ => self.file_handler.read_tables(path)?,
        };
        tables.iter().map(|table| self.stage_table(table)).collect()
    }

    /// Stage one table under its sanitized name
    ///
    /// # Returns
    /// * `Ok(String)` - Name of the staged table
    /// * `Err` if the table is not valid or a record does not fit the header
    pub fn stage_table(&mut self, table: &Table) -> SqlyResult<String> {
        table.valid()?;
        let name = sanitize_identifier(table.name());

        let types: Vec<ColumnType> = (0..table.header().len())
            .map(|idx| {
                ColumnType::infer(
                    table
                        .records()
                        .iter()
                        .filter_map(|record| record.get(idx).map(String::as_str)),
                )
            })
            .collect();

        let columns = table
            .header()
            .iter()
            .zip(&types)
            .map(|(column, column_type)| {
                format!("{} {}", quote_identifier(column), column_type.sql_name())
            })
            .collect::<Vec<_>>()
            .join(", ");
        let create = format!("CREATE TABLE {} ({columns})", quote_identifier(&name));
        debug!(sql = %create, "staging table");
        self.conn
            .execute(&create, [])
            .map_err(|e| SqlyError::store(StoreOp::Staging, e))?;

        let placeholders = vec!["?"; types.len()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({placeholders})", quote_identifier(&name));
        let tx = self
            .conn
            .transaction()
            .map_err(|e| SqlyError::store(StoreOp::Begin, e))?;
        {
            let mut stmt = tx
                .prepare(&insert)
                .map_err(|e| SqlyError::store(StoreOp::Prepare, e))?;
            for record in table.records() {
                let values = record
                    .iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        types
                            .get(idx)
                            .copied()
                            .unwrap_or(ColumnType::Text)
                            .value(cell)
                    })
                    .collect::<Vec<_>>();
                stmt.execute(params_from_iter(values.iter()))
                    .map_err(|e| SqlyError::store(StoreOp::Staging, e))?;
            }
        }
        tx.commit().map_err(|e| SqlyError::store(StoreOp::Commit, e))?;

        Ok(name)
    }

    /// Connection to the staging database
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_infer_column_types() {
        assert_eq!(ColumnType::infer(["1", "-2", ""].into_iter()), ColumnType::Integer);
        assert_eq!(ColumnType::infer(["1", "2.5"].into_iter()), ColumnType::Real);
        assert_eq!(ColumnType::infer(["0.1", "12.25"].into_iter()), ColumnType::Real);
        assert_eq!(ColumnType::infer(["1e3"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["1", "x"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["007"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["0.5", "-0.25"].into_iter()), ColumnType::Real);
        assert_eq!(ColumnType::infer(["NaN"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["inf"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["", ""].into_iter()), ColumnType::Text);
    }

    #[test]
    fn test_infer_keeps_non_canonical_numbers_as_text() {
        assert_eq!(
            ColumnType::infer(["12345678901234567891", "98765432109876543210"].into_iter()),
            ColumnType::Text
        );
        assert_eq!(ColumnType::infer(["1.50", "2.00"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["+5", "7"].into_iter()), ColumnType::Text);
        assert_eq!(ColumnType::infer(["1.5", "2"].into_iter()), ColumnType::Real);
    }

    #[test]
    fn test_stage_table_records_inferred_schema() {
        let mut staging = Staging::new().unwrap();
        let table = Table::new(
            "my.data",
            strings(&["id", "price", "name"]),
            vec![
                strings(&["1", "9.5", "pen"]),
                strings(&["2", "", "ink"]),
            ],
        );

        let name = staging.stage_table(&table).unwrap();
        assert_eq!(name, "my_data");

        let schema: String = staging
            .connection()
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = ?1",
                [&name],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(
            schema,
            "CREATE TABLE \"my_data\" (\"id\" INTEGER, \"price\" REAL, \"name\" TEXT)"
        );

        let nulls: i64 = staging
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM my_data WHERE price IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_stage_table_rejects_invalid_table() {
        let mut staging = Staging::new().unwrap();
        let empty = Table::new("t", strings(&["a"]), Vec::new());
        assert!(matches!(
            staging.stage_table(&empty),
            Err(SqlyError::EmptyRecords)
        ));
    }

    #[test]
    fn test_stage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "name,age\nJohn,25\n").unwrap();

        let mut staging = Staging::new().unwrap();
        assert_eq!(
            staging.stage_file(&path, Some("ignored")).unwrap(),
            vec!["people".to_string()]
        );
    }

    #[test]
    fn test_stage_file_selects_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        let sales = Table::new(
            "sales",
            strings(&["region", "total"]),
            vec![strings(&["north", "10"])],
        );
        FileHandler::new().dump(&path, &sales).unwrap();

        let mut staging = Staging::new().unwrap();
        assert_eq!(
            staging.stage_file(&path, None).unwrap(),
            vec!["book_sales".to_string()]
        );
        let mut staging = Staging::new().unwrap();
        assert_eq!(
            staging.stage_file(&path, Some("sales")).unwrap(),
            vec!["sales".to_string()]
        );
    }
}
