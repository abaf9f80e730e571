//! Test helpers for sqly integration tests
//!
//! This module provides helper functions and structs to simplify
//! writing end-to-end tests for the sqly binary.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Sample people table used by most tests
pub const PEOPLE_CSV: &str = "id,name,age\n1,Alice,30\n2,Bob,25\n3,Charlie,35\n";

/// Represents one run of the sqly binary
pub struct SqlyTestCase {
    /// Files created in a scratch directory before the run: (file name, content)
    pub files: Vec<(String, String)>,
    /// SQL statements passed with -s, in order
    pub sql: Vec<String>,
    /// Additional command line arguments
    pub args: Vec<String>,
    /// Expected strings in stdout
    pub expected_stdout: Vec<String>,
    /// Strings that must not appear in stdout
    pub unexpected_stdout: Vec<String>,
    /// Expected strings in stderr
    pub expected_stderr: Vec<String>,
    /// Whether the command is expected to succeed
    pub should_succeed: bool,
}

impl Default for SqlyTestCase {
    fn default() -> Self {
        SqlyTestCase {
            files: vec![("people.csv".to_string(), PEOPLE_CSV.to_string())],
            sql: Vec::new(),
            args: Vec::new(),
            expected_stdout: Vec::new(),
            unexpected_stdout: Vec::new(),
            expected_stderr: Vec::new(),
            should_succeed: true,
        }
    }
}

/// Write the test files, run sqly against them and check its output
pub fn run_test_case(test_case: SqlyTestCase) -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let mut paths = Vec::new();
    for (name, content) in &test_case.files {
        paths.push(write_file(temp_dir.path(), name, content)?);
    }

    let mut cmd = Command::cargo_bin("sqly")?;
    for sql in &test_case.sql {
        cmd.arg("-s").arg(sql);
    }
    cmd.args(&test_case.args);
    cmd.args(&paths);

    let mut assert = if test_case.should_succeed {
        cmd.assert().success()
    } else {
        cmd.assert().failure()
    };
    for expected in &test_case.expected_stdout {
        assert = assert.stdout(predicate::str::contains(expected.as_str()));
    }
    for unexpected in &test_case.unexpected_stdout {
        assert = assert.stdout(predicate::str::contains(unexpected.as_str()).not());
    }
    for expected in &test_case.expected_stderr {
        assert = assert.stderr(predicate::str::contains(expected.as_str()));
    }

    Ok(())
}

/// Create a file inside a scratch directory
pub fn write_file(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Convert string slices to owned strings
pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
