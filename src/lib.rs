//! Sqly library crate
//!
//! This is the library component of sqly, containing the core functionality
//! for a command-line utility that runs SQL against flat data files. The
//! library provides:
//!
//! - CSV, TSV, LTSV, JSON and spreadsheet loading and saving
//! - Transparent decoding of gzip, bzip2, xz and zstd inputs
//! - Column type inference while files are staged
//! - Batched, cancellable bulk loading into an embedded SQLite store
//! - Statement routing that runs queries and DML and refuses DDL, TCL and DCL
//!
//! Files flow through one canonical [`table::Table`] value, so every format
//! shares the same validation, storage and output paths.

pub mod cancel;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod csv_handler;
pub mod error;
pub mod excel_handler;
pub mod executor;
pub mod file_handler;
pub mod format;
pub mod json_handler;
pub mod loader;
pub mod ltsv_handler;
pub mod staging;
pub mod store;
pub mod table;
