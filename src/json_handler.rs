//! JSON file handling module for sqly
//!
//! A JSON source is an array of flat objects whose keys may differ from one
//! object to the next. The header is the sorted, de-duplicated union of every
//! key; a record fills keys it does not carry with an empty cell.
//!
//! Cell text depends on the JSON type of the value:
//!
//! - strings are kept verbatim
//! - integers print in decimal, floats in their shortest round-trip form
//! - booleans, nulls, arrays and objects become empty cells
//!
//! When writing, every record becomes an object keyed by the header. Cells
//! beyond the header have no key and are dropped with a warning.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::error::SqlyResult;
use crate::format::{open_reader, table_name_from_path};
use crate::table::{Record, Table};

/// JSON content as read from disk, before conversion to a Table
#[derive(Debug, Clone, PartialEq)]
pub struct Json {
    /// Name derived from the source file
    name: String,
    /// Decoded objects, in document order
    records: Vec<Map<String, Value>>,
}

impl Json {
    /// Get the name derived from the source file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sorted union of the keys of every object
    pub fn header(&self) -> Vec<String> {
        self.records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Convert into the canonical table representation
    pub fn to_table(&self) -> Table {
        let header = self.header();
        let records = self
            .records
            .iter()
            .map(|object| {
                header
                    .iter()
                    .map(|key| object.get(key).map(|v| Cell::from(v).to_text()).unwrap_or_default())
                    .collect::<Record>()
            })
            .collect();
        Table::new(self.name.clone(), header, records)
    }
}

/// Shape of a decoded JSON value, one formatting rule per variant
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell<'a> {
    String(&'a str),
    Number(&'a Number),
    Bool(bool),
    Null,
    Other,
}

impl<'a> From<&'a Value> for Cell<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Cell::String(s),
            Value::Number(n) => Cell::Number(n),
            Value::Bool(b) => Cell::Bool(*b),
            Value::Null => Cell::Null,
            Value::Array(_) | Value::Object(_) => Cell::Other,
        }
    }
}

impl Cell<'_> {
    fn to_text(self) -> String {
        match self {
            Cell::String(s) => s.to_string(),
            Cell::Number(n) => number_text(n),
            // Nested and non-scalar values are not represented in a flat table.
            Cell::Bool(_) | Cell::Null | Cell::Other => String::new(),
        }
    }
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}

/// Handles loading and saving JSON files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHandler;

impl JsonHandler {
    pub fn new() -> Self {
        JsonHandler
    }

    /// Read a JSON file, decoding any compression suffix
    pub fn list(&self, path: &Path) -> SqlyResult<Json> {
        let reader = open_reader(path)?;
        self.list_from_reader(table_name_from_path(path), reader)
    }

    /// Decode a JSON array of objects from any reader
    ///
    /// # Returns
    /// * `Ok(Json)` holding every object in document order
    /// * `Err(SqlyError::Json)` if the document is not an array of objects
    pub fn list_from_reader<R: Read>(&self, name: String, reader: R) -> SqlyResult<Json> {
        let records: Vec<Map<String, Value>> = serde_json::from_reader(reader)?;
        Ok(Json { name, records })
    }

    /// Write a table to a file, replacing any previous content
    pub fn dump(&self, path: &Path, table: &Table) -> SqlyResult<()> {
        let file = File::create(path)?;
        self.dump_to_writer(BufWriter::new(file), table)
    }

    /// Write a table as an indented array of objects with string values
    pub fn dump_to_writer<W: Write>(&self, mut writer: W, table: &Table) -> SqlyResult<()> {
        let objects: Vec<Map<String, Value>> = table
            .records()
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                if record.len() > table.header().len() {
                    warn!(
                        table = table.name(),
                        record = idx + 1,
                        dropped = record.len() - table.header().len(),
                        "JSON record has more cells than keys"
                    );
                }
                table
                    .header()
                    .iter()
                    .zip(record.iter())
                    .map(|(key, cell)| (key.clone(), Value::String(cell.clone())))
                    .collect()
            })
            .collect();

        serde_json::to_writer_pretty(&mut writer, &objects)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_header_is_sorted_union_of_keys() {
        let json = JsonHandler::new()
            .list_from_reader(
                "t".to_string(),
                r#"[{"id":"1","date":"2022-11-23"},{"id":"2","data":"x"}]"#.as_bytes(),
            )
            .unwrap();
        let table = json.to_table();

        assert_eq!(table.header(), strings(&["data", "date", "id"]).as_slice());
        assert_eq!(table.records()[0], strings(&["", "2022-11-23", "1"]));
        assert_eq!(table.records()[1], strings(&["x", "", "2"]));
    }

    #[test]
    fn test_value_coercion() {
        let json = JsonHandler::new()
            .list_from_reader(
                "t".to_string(),
                r#"[{"a":12,"b":1.5,"c":true,"d":null,"e":[1,2],"f":{"k":"v"},"g":"s","h":-7,"i":1e21}]"#
                    .as_bytes(),
            )
            .unwrap();
        let table = json.to_table();

        assert_eq!(
            table.records()[0],
            strings(&["12", "1.5", "", "", "", "", "s", "-7", "1000000000000000000000"])
        );
    }

    #[test]
    fn test_list_rejects_non_array_document() {
        let result = JsonHandler::new().list_from_reader("t".to_string(), r#"{"id":1}"#.as_bytes());
        assert!(matches!(result, Err(crate::error::SqlyError::Json(_))));
    }

    #[test]
    fn test_dump_then_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        let table = Table::new(
            "items",
            strings(&["id", "name"]),
            vec![strings(&["1", "pen"]), strings(&["2", "ink"])],
        );

        let handler = JsonHandler::new();
        handler.dump(&path, &table).unwrap();
        assert_eq!(handler.list(&path).unwrap().to_table(), table);
    }

    #[test]
    fn test_dump_keys_cells_by_header() {
        let table = Table::new(
            "items",
            strings(&["id", "name"]),
            vec![strings(&["1", "pen", "extra"]), strings(&["2"])],
        );

        let mut out = Vec::new();
        JsonHandler::new().dump_to_writer(&mut out, &table).unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"id": "1", "name": "pen"}, {"id": "2"}])
        );
    }
}
