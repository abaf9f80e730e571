//! File handling module for sqly
//!
//! This module provides a unified interface for reading and writing every
//! supported file format:
//! - CSV and TSV files
//! - LTSV files
//! - JSON files
//! - Spreadsheet workbooks
//!
//! It picks the adapter from the file extension, so the rest of the
//! application only deals with tables and paths.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::OutputMode;
use crate::csv_handler::CsvHandler;
use crate::error::{SqlyError, SqlyResult};
use crate::excel_handler::ExcelHandler;
use crate::format::{detect_format, strip_compression, FileFormat};
use crate::json_handler::JsonHandler;
use crate::ltsv_handler::LtsvHandler;
use crate::table::Table;

/// Unified file handler that delegates to specific format handlers
#[derive(Debug, Clone, Copy)]
pub struct FileHandler {
    /// Handler for CSV files
    csv_handler: CsvHandler,

    /// Handler for TSV files
    tsv_handler: CsvHandler,

    /// Handler for LTSV files
    ltsv_handler: LtsvHandler,

    /// Handler for JSON files
    json_handler: JsonHandler,

    /// Handler for spreadsheet workbooks
    excel_handler: ExcelHandler,
}

impl FileHandler {
    /// Create a new FileHandler
    pub fn new() -> Self {
        FileHandler {
            csv_handler: CsvHandler::csv(),
            tsv_handler: CsvHandler::tsv(),
            ltsv_handler: LtsvHandler::new(),
            json_handler: JsonHandler::new(),
            excel_handler: ExcelHandler::new(),
        }
    }

    /// Read every table a file contains
    ///
    /// Delimited, LTSV and JSON files hold exactly one table; a workbook
    /// holds one table per sheet.
    ///
    /// # Arguments
    /// * `path` - Path to the file, optionally compressed
    ///
    /// # Returns
    /// * `Ok(Vec<Table>)` with the tables in file order
    /// * `Err(SqlyError::UnsupportedFormat)` if the extension is unknown
    /// * `Err` from the adapter if the file is unreadable or malformed
    pub fn read_tables(&self, path: &Path) -> SqlyResult<Vec<Table>> {
        let format =
            detect_format(path).ok_or_else(|| SqlyError::UnsupportedFormat(path.to_path_buf()))?;
        debug!(path = %path.display(), ?format, "reading file");

        let tables = match format {
            FileFormat::Csv => vec![self.csv_handler.list(path)?.to_table()],
            FileFormat::Tsv => vec![self.tsv_handler.list(path)?.to_table()],
            FileFormat::Ltsv => vec![self.ltsv_handler.list(path)?.to_table()],
            FileFormat::Json => vec![self.json_handler.list(path)?.to_table()],
            FileFormat::Excel => self
                .excel_handler
                .list_all(path)?
                .iter()
                .map(|sheet| sheet.to_table())
                .collect(),
        };
        Ok(tables)
    }

    /// Read one named sheet of a workbook
    pub fn read_sheet(&self, path: &Path, sheet_name: &str) -> SqlyResult<Table> {
        Ok(self.excel_handler.list(path, sheet_name)?.to_table())
    }

    /// Write a table to a file whose format is chosen by its extension
    ///
    /// Compression suffixes are not supported for output.
    pub fn dump(&self, path: &Path, table: &Table) -> SqlyResult<()> {
        let file_name = file_name(path);
        let (_, layers) = strip_compression(&file_name);
        let format = match detect_format(path) {
            Some(format) if layers.is_empty() => format,
            _ => return Err(SqlyError::UnsupportedFormat(path.to_path_buf())),
        };
        debug!(path = %path.display(), ?format, table = table.name(), "writing file");

        match format {
            FileFormat::Csv => self.csv_handler.dump(path, table),
            FileFormat::Tsv => self.tsv_handler.dump(path, table),
            FileFormat::Ltsv => self.ltsv_handler.dump(path, table),
            FileFormat::Json => self.json_handler.dump(path, table),
            FileFormat::Excel => self.excel_handler.dump(path, table),
        }
    }

    /// Write a table to any writer in a text output mode
    pub fn print<W: Write>(&self, mode: OutputMode, writer: W, table: &Table) -> SqlyResult<()> {
        match mode {
            OutputMode::Csv => self.csv_handler.dump_to_writer(writer, table),
            OutputMode::Tsv => self.tsv_handler.dump_to_writer(writer, table),
            OutputMode::Ltsv => self.ltsv_handler.dump_to_writer(writer, table),
            OutputMode::Json => self.json_handler.dump_to_writer(writer, table),
        }
    }
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand input paths into the list of files to load
///
/// Files are kept as given. A directory contributes the supported files it
/// directly contains, sorted by path; anything else in it is skipped.
pub fn expand_paths<P: AsRef<Path>>(paths: &[P]) -> SqlyResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && detect_format(&entry_path).is_some() {
                entries.push(entry_path);
            } else {
                debug!(path = %entry_path.display(), "skipping unsupported directory entry");
            }
        }
        entries.sort();
        files.extend(entries);
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            "items",
            vec!["id".to_string(), "name".to_string()],
            vec![vec!["1".to_string(), "pen".to_string()]],
        )
    }

    #[test]
    fn test_dump_and_read_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FileHandler::new();

        for ext in ["csv", "tsv", "ltsv", "json"] {
            let path = dir.path().join(format!("items.{ext}"));
            handler.dump(&path, &sample()).unwrap();
            let tables = handler.read_tables(&path).unwrap();
            assert_eq!(tables, vec![sample()], "round trip through .{ext}");
        }

        let path = dir.path().join("items.xlsx");
        handler.dump(&path, &sample()).unwrap();
        let table = handler.read_sheet(&path, "items").unwrap();
        assert_eq!(table, sample());
    }

    #[test]
    fn test_unsupported_extensions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FileHandler::new();

        let txt = dir.path().join("notes.txt");
        assert!(matches!(
            handler.dump(&txt, &sample()),
            Err(SqlyError::UnsupportedFormat(_))
        ));
        let gz = dir.path().join("items.csv.gz");
        assert!(matches!(
            handler.dump(&gz, &sample()),
            Err(SqlyError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            handler.read_tables(&txt),
            Err(SqlyError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_expand_paths_lists_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "id\n1\n").unwrap();
        fs::write(dir.path().join("a.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        let single = dir.path().join("b.csv");

        let files = expand_paths(&[dir.path().to_path_buf(), single.clone()]).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.json"), dir.path().join("b.csv"), single]
        );
    }

    #[test]
    fn test_print_modes() {
        let handler = FileHandler::new();
        let mut out = Vec::new();
        handler.print(OutputMode::Tsv, &mut out, &sample()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id\tname\n1\tpen\n");

        let mut out = Vec::new();
        handler.print(OutputMode::Ltsv, &mut out, &sample()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id:1\tname:pen\n");
    }
}
