//! LTSV file handling module for sqly
//!
//! Labeled Tab-Separated Values store one record per line as tab-separated
//! `label:data` fields. The header is built from the labels of the first
//! line. Later lines are reconciled by label: each header label picks the
//! field with the same label on that line, an absent label yields an empty
//! cell, and labels that the first line never declared are dropped.
//!
//! The format has no escaping. When writing, tabs and line breaks inside a
//! label or a cell are replaced with spaces so every record stays on one
//! parseable line, and cells beyond the header have no label to carry them.
//! Both cases are logged as warnings.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::warn;

use crate::error::{SqlyError, SqlyResult};
use crate::format::{open_reader, table_name_from_path};
use crate::table::{Record, Table};

/// LTSV content as read from disk, before conversion to a Table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ltsv {
    /// Name derived from the source file
    name: String,
    /// Labels of the first line, in order
    label: Vec<String>,
    /// Data of every line, aligned with `label`
    records: Vec<Record>,
}

impl Ltsv {
    /// Get the name derived from the source file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the labels
    pub fn label(&self) -> &[String] {
        &self.label
    }

    /// Get the data rows
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Convert into the canonical table representation
    pub fn to_table(&self) -> Table {
        Table::new(self.name.clone(), self.label.clone(), self.records.clone())
    }
}

/// Handles loading and saving LTSV files
#[derive(Debug, Clone, Copy, Default)]
pub struct LtsvHandler;

impl LtsvHandler {
    pub fn new() -> Self {
        LtsvHandler
    }

    /// Read an LTSV file, decoding any compression suffix
    pub fn list(&self, path: &Path) -> SqlyResult<Ltsv> {
        let reader = open_reader(path)?;
        self.list_from_reader(table_name_from_path(path), reader)
    }

    /// Read LTSV content from any reader
    ///
    /// # Returns
    /// * `Ok(Ltsv)` with the labels of the first line and one record per line
    /// * `Err(SqlyError::NoLabel)` if any field lacks a label
    /// * `Err(SqlyError::Io)` if reading fails
    pub fn list_from_reader<R: Read>(&self, name: String, reader: R) -> SqlyResult<Ltsv> {
        let mut label: Vec<String> = Vec::new();
        let mut records = Vec::new();

        for line in BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let fields = line
                .split('\t')
                .map(label_and_data)
                .collect::<SqlyResult<Vec<_>>>()?;

            if label.is_empty() {
                label = fields.iter().map(|(l, _)| l.to_string()).collect();
                records.push(fields.iter().map(|(_, d)| d.to_string()).collect());
                continue;
            }

            let by_label: HashMap<&str, &str> = fields.iter().copied().collect();
            for &(l, _) in &fields {
                if !label.iter().any(|known| known == l) {
                    warn!(label = %l, "dropping LTSV label missing from the first line");
                }
            }
            records.push(
                label
                    .iter()
                    .map(|l| by_label.get(l.as_str()).copied().unwrap_or("").to_string())
                    .collect(),
            );
        }

        Ok(Ltsv {
            name,
            label,
            records,
        })
    }

    /// Write a table to a file, replacing any previous content
    pub fn dump(&self, path: &Path, table: &Table) -> SqlyResult<()> {
        let file = File::create(path)?;
        self.dump_to_writer(BufWriter::new(file), table)
    }

    /// Write every record as one line of `label:data` fields
    pub fn dump_to_writer<W: Write>(&self, mut writer: W, table: &Table) -> SqlyResult<()> {
        let labels: Vec<Cow<'_, str>> = table.header().iter().map(|l| one_line(l)).collect();
        for (idx, record) in table.records().iter().enumerate() {
            if record.len() > labels.len() {
                warn!(
                    table = table.name(),
                    record = idx + 1,
                    dropped = record.len() - labels.len(),
                    "LTSV record has more cells than labels"
                );
            }
            let line = labels
                .iter()
                .zip(record.iter())
                .map(|(label, data)| format!("{label}:{}", one_line(data)))
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

// Tabs and line breaks would split the field or the record.
fn one_line(text: &str) -> Cow<'_, str> {
    if !text.contains(['\t', '\n', '\r']) {
        return Cow::Borrowed(text);
    }
    warn!(text, "replacing tabs and line breaks in LTSV output");
    Cow::Owned(text.replace(['\t', '\n', '\r'], " "))
}

/// Split an LTSV field into its label and its data
///
/// The label is everything before the first `:`; the data is everything
/// after it, so `time:12:30` yields `("time", "12:30")`.
pub fn label_and_data(field: &str) -> SqlyResult<(&str, &str)> {
    match field.split_once(':') {
        Some((label, data)) if !label.is_empty() => Ok((label, data)),
        _ => Err(SqlyError::NoLabel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_list_header_from_first_line() {
        let ltsv = LtsvHandler::new()
            .list_from_reader(
                "t".to_string(),
                "id:1\tname:Gina\nid:2\tname:Yulia\n".as_bytes(),
            )
            .unwrap();
        assert_eq!(ltsv.label(), strings(&["id", "name"]).as_slice());
        assert_eq!(
            ltsv.records(),
            &[strings(&["1", "Gina"]), strings(&["2", "Yulia"])]
        );
    }

    #[test]
    fn test_list_reconciles_by_label() {
        let ltsv = LtsvHandler::new()
            .list_from_reader(
                "t".to_string(),
                "id:1\tname:Gina\nname:Yulia\tid:2\nid:3\textra:x\n".as_bytes(),
            )
            .unwrap();
        assert_eq!(
            ltsv.records(),
            &[
                strings(&["1", "Gina"]),
                strings(&["2", "Yulia"]),
                strings(&["3", ""]),
            ]
        );
    }

    #[test]
    fn test_label_and_data() {
        assert_eq!(label_and_data("time:12:30").unwrap(), ("time", "12:30"));
        assert_eq!(label_and_data("empty:").unwrap(), ("empty", ""));
        assert!(matches!(label_and_data("nolabel"), Err(SqlyError::NoLabel)));
        assert!(matches!(label_and_data(":data"), Err(SqlyError::NoLabel)));
    }

    #[test]
    fn test_list_rejects_unlabeled_field() {
        let result = LtsvHandler::new()
            .list_from_reader("t".to_string(), "id:1\tbroken\n".as_bytes());
        assert!(matches!(result, Err(SqlyError::NoLabel)));
    }

    #[test]
    fn test_dump_then_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.ltsv");
        let table = Table::new(
            "access",
            strings(&["host", "time"]),
            vec![
                strings(&["127.0.0.1", "10:00"]),
                strings(&["10.0.0.1", "11:30"]),
            ],
        );

        let handler = LtsvHandler::new();
        handler.dump(&path, &table).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "host:127.0.0.1\ttime:10:00\nhost:10.0.0.1\ttime:11:30\n"
        );
        assert_eq!(handler.list(&path).unwrap().to_table(), table);
    }

    #[test]
    fn test_dump_keeps_each_record_on_one_line() {
        let table = Table::new(
            "notes",
            strings(&["id", "body"]),
            vec![
                strings(&["1", "tab\there"]),
                strings(&["2", "two\r\nlines", "extra"]),
            ],
        );

        let mut out = Vec::new();
        LtsvHandler::new().dump_to_writer(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "id:1\tbody:tab here\nid:2\tbody:two  lines\n");

        let reread = LtsvHandler::new()
            .list_from_reader("notes".to_string(), text.as_bytes())
            .unwrap();
        assert_eq!(reread.records().len(), 2);
        assert_eq!(reread.records()[1], strings(&["2", "two  lines"]));
    }
}
