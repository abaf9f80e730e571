//! sqly - run SQL against CSV, TSV, LTSV, JSON and spreadsheet files
//!
//! This tool loads flat data files into an embedded SQLite database, runs
//! SQL statements against them, and prints or saves the results.
//!
//! # Program Flow
//!
//! 1. Parse command-line arguments and build the configuration
//! 2. Load every input file into the store, one table per file or sheet
//! 3. Answer introspection requests (--tables, --header)
//! 4. Execute SQL statements in sequence
//! 5. Print query results to stdout or write them to the output file

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqly::cli;
use sqly::config::AppConfig;
use sqly::executor::{ExecOutcome, SqlExecutor};
use sqly::file_handler::FileHandler;
use sqly::loader::BulkLoader;
use sqly::store::{SqliteStore, Store};
use sqly::table::Table;

fn main() -> Result<()> {
    let args = cli::parse_args()?;
    init_logging(args.verbose);

    let config = args.to_config();
    let mut store = SqliteStore::from_config(&config).context("Failed to open the database")?;

    let report = BulkLoader::new(&config)
        .load(&mut store, &args.files)
        .context("Failed to load input files")?;
    for table in report.tables() {
        info!(
            table = %table.name,
            rows = table.rows,
            batches = table.batches,
            "loaded"
        );
    }

    let file_handler = FileHandler::new();
    let mut executor = SqlExecutor::new(store);

    if args.tables {
        let tables = executor.store().tables_name().context("Failed to list tables")?;
        print_tables(&tables)?;
    }

    if let Some(name) = &args.header {
        let header = executor
            .store()
            .header(name)
            .with_context(|| format!("Failed to read the header of table: {name}"))?;
        print_tables(std::slice::from_ref(&header))?;
    }

    for sql in &args.sql {
        let outcome = executor
            .exec_sql(sql)
            .with_context(|| format!("Failed to execute SQL: {sql}"))?;

        match outcome {
            ExecOutcome::Rows(table) => match config.output_path() {
                Some(path) => {
                    file_handler
                        .dump(path, &table)
                        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
                    info!(path = %path.display(), rows = table.record_count(), "results written");
                }
                None => print_table(&file_handler, &config, &table)?,
            },
            ExecOutcome::Affected(count) => println!("{count} row(s) affected"),
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sqly=debug")
    } else {
        EnvFilter::new("sqly=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn print_table(file_handler: &FileHandler, config: &AppConfig, table: &Table) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    file_handler
        .print(config.output_mode(), &mut out, table)
        .context("Failed to print results")?;
    out.flush()?;
    Ok(())
}

/// Print `name: col1, col2, ...` per table, whatever the output mode
fn print_tables(tables: &[Table]) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for table in tables {
        writeln!(out, "{}: {}", table.name(), table.header().join(", "))?;
    }
    out.flush()?;
    Ok(())
}
