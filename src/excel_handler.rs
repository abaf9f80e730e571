//! Spreadsheet file handling module for sqly
//!
//! Each worksheet maps to one table: the first row holds the header and the
//! remaining rows hold the records. Reading goes through calamine, writing
//! through rust_xlsxwriter.

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::{SqlyError, SqlyResult};
use crate::format::{open_reader, table_name_from_path};
use crate::table::{Record, Table};

/// One worksheet as read from disk, before conversion to a Table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Table name for this sheet
    name: String,
    /// First row of the sheet
    header: Vec<String>,
    /// Remaining rows of the sheet
    records: Vec<Record>,
}

impl Sheet {
    fn from_range(name: String, range: &Range<Data>) -> Self {
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Record>());
        let header = rows.next().unwrap_or_default();
        Sheet {
            name,
            header,
            records: rows.collect(),
        }
    }

    /// Get the table name of the sheet
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the header row
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Get the data rows
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Convert into the canonical table representation
    pub fn to_table(&self) -> Table {
        Table::new(self.name.clone(), self.header.clone(), self.records.clone())
    }
}

/// Handles loading and saving spreadsheet workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct ExcelHandler;

impl ExcelHandler {
    pub fn new() -> Self {
        ExcelHandler
    }

    /// Read exactly one named sheet
    ///
    /// # Arguments
    /// * `path` - Workbook path (compression suffixes are decoded)
    /// * `sheet_name` - Name of the worksheet; it also becomes the table name
    ///
    /// # Returns
    /// * `Ok(Sheet)` with the header and records of that sheet
    /// * `Err(SqlyError::Spreadsheet)` if the workbook or the sheet cannot be read
    pub fn list(&self, path: &Path, sheet_name: &str) -> SqlyResult<Sheet> {
        let mut workbook = open_workbook(path)?;
        let range = workbook.worksheet_range(sheet_name)?;
        Ok(Sheet::from_range(sheet_name.to_string(), &range))
    }

    /// Read every sheet of a workbook, naming each table `<file>_<sheet>`
    pub fn list_all(&self, path: &Path) -> SqlyResult<Vec<Sheet>> {
        let mut workbook = open_workbook(path)?;
        let file_name = table_name_from_path(path);

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            sheets.push(Sheet::from_range(
                format!("{file_name}_{sheet_name}"),
                &range,
            ));
        }
        Ok(sheets)
    }

    /// Write a table into a new workbook with a single sheet named after the table
    ///
    /// The header goes to the first row and records follow sequentially.
    pub fn dump(&self, path: &Path, table: &Table) -> SqlyResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.name())?;

        let rows = std::iter::once(table.header()).chain(table.records().iter().map(Vec::as_slice));
        for (row_idx, row) in rows.enumerate() {
            let row_num = u32::try_from(row_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col_idx, value) in row.iter().enumerate() {
                let col_num =
                    u16::try_from(col_idx).map_err(|_| XlsxError::RowColumnLimitError)?;
                worksheet.write_string(row_num, col_num, value)?;
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

fn open_workbook(path: &Path) -> SqlyResult<Xlsx<Cursor<Vec<u8>>>> {
    let mut buffer = Vec::new();
    open_reader(path)?.read_to_end(&mut buffer)?;
    Xlsx::new(Cursor::new(buffer)).map_err(SqlyError::Spreadsheet)
}
