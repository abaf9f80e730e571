//! Delimited file handling module for sqly
//!
//! This module reads CSV and TSV files into tables and writes tables back out.
//! Both formats share one implementation that only differs in its delimiter:
//!
//! - Row 0 becomes the header, every later row becomes a record verbatim
//! - No type inference happens here; every cell stays a string
//! - Rows are not checked against the header length
//!
//! The module reuses the csv crate for quoting rules and configures it with
//! the delimiter of the selected format.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::SqlyResult;
use crate::format::{open_reader, table_name_from_path};
use crate::table::{Record, Table};

/// Delimited file content as read from disk, before conversion to a Table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimited {
    /// Name derived from the source file
    name: String,
    /// First row of the file
    header: Vec<String>,
    /// Remaining rows of the file
    records: Vec<Record>,
}

impl Delimited {
    /// Get the name derived from the source file
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

/// Handles loading and saving delimiter-separated files
#[derive(Debug, Clone, Copy)]
pub struct CsvHandler {
    /// Field separator byte
    delimiter: u8,
}

impl CsvHandler {
    /// Handler for comma-separated files
    pub fn csv() -> Self {
        CsvHandler { delimiter: b',' }
    }

    /// Handler for tab-separated files
    pub fn tsv() -> Self {
        CsvHandler { delimiter: b'\t' }
    }

    /// Get the delimiter byte
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Read a delimited file, decoding any compression suffix
    ///
    /// # Arguments
    /// * `path` - Path to the file; the table name is derived from it
    ///
    /// # Returns
    /// * `Ok(Delimited)` with the header and records of the file
    /// * `Err` if the file cannot be opened or is malformed
    pub fn list(&self, path: &Path) -> SqlyResult<Delimited> {
        let reader = open_reader(path)?;
        self.list_from_reader(table_name_from_path(path), reader)
    }

    /// Read delimited content from any reader
    pub fn list_from_reader<R: Read>(&self, name: String, reader: R) -> SqlyResult<Delimited> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let mut header = Vec::new();
        let mut records = Vec::new();
        for (i, result) in csv_reader.records().enumerate() {
            let row: Record = result?.iter().map(|field| field.to_string()).collect();
            if i == 0 {
                header = row;
            } else {
                records.push(row);
            }
        }

        Ok(Delimited {
            name,
            header,
            records,
        })
    }

    /// Write a table to a file, replacing any previous content
    pub fn dump(&self, path: &Path, table: &Table) -> SqlyResult<()> {
        let file = File::create(path)?;
        self.dump_to_writer(BufWriter::new(file), table)
    }

    /// Write a table to any writer: header first, then every record
    pub fn dump_to_writer<W: Write>(&self, writer: W, table: &Table) -> SqlyResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(table.header())?;
        for record in table.records() {
            csv_writer.write_record(record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
