//! File format detection for sqly
//!
//! This module inspects file names to decide how a file is decoded:
//!
//! - which compression layers wrap it (`.gz`, `.bz2`, `.xz`, `.zst`, possibly stacked)
//! - which tabular format lies underneath (CSV, TSV, LTSV, JSON, spreadsheet)
//! - which table name it yields
//!
//! It also opens files through the matching decompressors so that adapters
//! only ever see a plain byte stream.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SqlyResult;

/// Tabular formats understood by sqly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Labeled tab-separated values
    Ltsv,
    /// Array of flat JSON objects
    Json,
    /// Spreadsheet workbook (xlsx)
    Excel,
}

impl FileFormat {
    /// Map a lower-case extension (without the dot) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(FileFormat::Csv),
            "tsv" => Some(FileFormat::Tsv),
            "ltsv" => Some(FileFormat::Ltsv),
            "json" => Some(FileFormat::Json),
            "xlsx" => Some(FileFormat::Excel),
            _ => None,
        }
    }
}

/// Compression wrappers recognised by suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    fn from_suffix(name: &str) -> Option<(Self, usize)> {
        const SUFFIXES: [(&str, Compression); 4] = [
            (".gz", Compression::Gzip),
            (".bz2", Compression::Bzip2),
            (".xz", Compression::Xz),
            (".zst", Compression::Zstd),
        ];
        let lower = name.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix) && lower.len() > suffix.len())
            .map(|(suffix, compression)| (*compression, suffix.len()))
    }
}

/// Split a file name into its uncompressed name and its compression layers
///
/// Layers are returned outermost first, so `a.csv.gz.zst` yields
/// `("a.csv", [Zstd, Gzip])`.
pub fn strip_compression(file_name: &str) -> (&str, Vec<Compression>) {
    let mut name = file_name;
    let mut layers = Vec::new();
    while let Some((compression, len)) = Compression::from_suffix(name) {
        layers.push(compression);
        name = &name[..name.len() - len];
    }
    (name, layers)
}

/// Detect the tabular format of a path, looking through compression suffixes
///
/// # Returns
/// * `Some(FileFormat)` for supported extensions
/// * `None` otherwise
pub fn detect_format(path: &Path) -> Option<FileFormat> {
    let file_name = path.file_name()?.to_str()?;
    let (name, _) = strip_compression(file_name);
    let (_, ext) = name.rsplit_once('.')?;
    FileFormat::from_extension(&ext.to_ascii_lowercase())
}

/// Derive a table name from a file path
///
/// Compression suffixes are stripped repeatedly from the base name, then the
/// remaining extension is stripped once:
/// `/p/my.data.file.csv.gz` becomes `my.data.file`.
pub fn table_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let (name, _) = strip_compression(&file_name);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[..idx].to_string(),
        _ => name.to_string(),
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`
pub fn sanitize_identifier(name: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"));
    invalid.replace_all(name, "_").into_owned()
}

/// Open a file for reading, transparently decoding its compression layers
pub fn open_reader(path: &Path) -> SqlyResult<Box<dyn Read>> {
    let file = File::open(path)?;
    let mut reader: Box<dyn Read> = Box::new(BufReader::new(file));

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let (_, layers) = strip_compression(&file_name);

    for layer in layers {
        reader = match layer {
            Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        };
    }

    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_table_name_from_path() {
        assert_eq!(
            table_name_from_path(Path::new("/p/my.data.file.csv.gz")),
            "my.data.file"
        );
        assert_eq!(table_name_from_path(Path::new("users.csv")), "users");
        assert_eq!(table_name_from_path(Path::new("logs.ltsv.zst.gz")), "logs");
        assert_eq!(table_name_from_path(Path::new("README")), "README");
        assert_eq!(table_name_from_path(Path::new("data.json.bz2")), "data");
        assert_eq!(table_name_from_path(Path::new("a.tsv.xz")), "a");
    }

    #[test]
    fn test_sanitized_table_name() {
        let stored = |path: &str| sanitize_identifier(&table_name_from_path(Path::new(path)));
        assert_eq!(stored("/p/my.data.file.csv.gz"), "my_data_file");
        assert_eq!(stored("sales-2024 q1.csv"), "sales_2024_q1");
        assert_eq!(sanitize_identifier("ok_Name9"), "ok_Name9");
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a.csv")), Some(FileFormat::Csv));
        assert_eq!(detect_format(Path::new("a.TSV")), Some(FileFormat::Tsv));
        assert_eq!(detect_format(Path::new("a.ltsv.gz")), Some(FileFormat::Ltsv));
        assert_eq!(detect_format(Path::new("a.json.zst")), Some(FileFormat::Json));
        assert_eq!(detect_format(Path::new("book.xlsx")), Some(FileFormat::Excel));
        assert_eq!(detect_format(Path::new("notes.txt")), None);
        assert_eq!(detect_format(Path::new("archive.gz")), None);
    }

    #[test]
    fn test_strip_compression_orders_layers_outermost_first() {
        let (name, layers) = strip_compression("a.csv.gz.zst");
        assert_eq!(name, "a.csv");
        assert_eq!(layers, vec![Compression::Zstd, Compression::Gzip]);
    }

    #[test]
    fn test_open_reader_decodes_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("data.csv.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"id,name\n1,Gina\n").unwrap();
        encoder.finish().unwrap();

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "id,name\n1,Gina\n");
    }

    #[test]
    fn test_open_reader_decodes_zstd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.tsv.zst");
        let compressed = zstd::encode_all(&b"id\tname\n1\tGina\n"[..], 0).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "id\tname\n1\tGina\n");
    }

    #[test]
    fn test_open_reader_decodes_bzip2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json.bz2");
        let file = File::create(&path).unwrap();
        let mut encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
        encoder.write_all(br#"[{"id":"1"}]"#).unwrap();
        encoder.finish().unwrap();

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, r#"[{"id":"1"}]"#);
    }

    #[test]
    fn test_open_reader_decodes_xz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.ltsv.xz");
        let file = File::create(&path).unwrap();
        let mut encoder = xz2::write::XzEncoder::new(file, 6);
        encoder.write_all(b"id:1\tname:Gina\n").unwrap();
        encoder.finish().unwrap();

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "id:1\tname:Gina\n");
    }

    #[test]
    fn test_open_reader_decodes_stacked_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv.xz.bz2");

        let mut inner = xz2::write::XzEncoder::new(Vec::new(), 6);
        inner.write_all(b"id\n7\n").unwrap();
        let xz_bytes = inner.finish().unwrap();
        let mut outer =
            bzip2::write::BzEncoder::new(File::create(&path).unwrap(), bzip2::Compression::best());
        outer.write_all(&xz_bytes).unwrap();
        outer.finish().unwrap();

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "id\n7\n");
    }
}
