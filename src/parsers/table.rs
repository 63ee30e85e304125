// ==============================================================================
// table.rs - Delimited Table Parser
// ==============================================================================
// Description: Loads CSV/TSV result tables (optionally gzipped) into datasets
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Delimited text with a header row, first column is the sample ID
// Example:
//   ID,ST,Country
//   isolate1,131,UK
//   isolate2,,France
// ==============================================================================

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::models::{CellValue, Dataset};

/// Errors that can occur during table parsing
#[derive(Error, Debug)]
pub enum TableParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unknown delimiter in {path:?} (expected tab or comma)")]
    UnknownDelimiter { path: PathBuf },

    #[error("File is empty or has no header")]
    EmptyFile,

    #[error("Invalid row at line {line}: expected {expected} fields, found {found}")]
    InvalidRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Untyped table exactly as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Tag every field, normalising absent values to the missing placeholder
    pub fn into_dataset(self) -> Dataset {
        let mut dataset = Dataset::new(self.headers);
        for record in self.records {
            dataset.push_row(record.iter().map(|raw| CellValue::parse(raw)).collect());
        }
        dataset
    }

    /// First-column values, in row order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter_map(|record| record.first().map(String::as_str))
    }
}

/// Delimited table parser
pub struct TableParser;

impl TableParser {
    /// Parse a result table into a typed dataset
    ///
    /// # Arguments
    /// * `path` - Path to a `.csv`, `.tsv`, `.txt` or gzipped table
    ///
    /// # Returns
    /// * `Ok(Dataset)` - Columns in file order, cells tagged, blanks as "NA"
    /// * `Err(TableParseError)` - Parse error
    pub fn parse(path: impl AsRef<Path>) -> Result<Dataset, TableParseError> {
        Ok(Self::read_raw(path)?.into_dataset())
    }

    /// Read a table without tagging cells
    pub fn read_raw(path: impl AsRef<Path>) -> Result<RawTable, TableParseError> {
        let path = path.as_ref();
        let contents = Self::read_contents(path)?;

        let first_line = contents.lines().next().ok_or(TableParseError::EmptyFile)?;
        let delimiter = Self::detect_delimiter(first_line).ok_or_else(|| {
            TableParseError::UnknownDelimiter {
                path: path.to_path_buf(),
            }
        })?;
        debug!(
            "Reading {:?} with delimiter {:?}",
            path,
            char::from(delimiter)
        );

        Self::read_str(&contents, delimiter)
    }

    /// Pick the field separator from the header line: tab first, then comma
    pub fn detect_delimiter(first_line: &str) -> Option<u8> {
        if first_line.contains('\t') {
            Some(b'\t')
        } else if first_line.contains(',') {
            Some(b',')
        } else {
            None
        }
    }

    /// Parse already-loaded text with a known delimiter
    pub fn read_str(contents: &str, delimiter: u8) -> Result<RawTable, TableParseError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(contents.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(TableParseError::EmptyFile);
        }

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() != headers.len() {
                return Err(TableParseError::InvalidRow {
                    // Header is line 1
                    line: idx + 2,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            records.push(record.iter().map(|field| field.trim().to_string()).collect());
        }

        Ok(RawTable { headers, records })
    }

    fn read_contents(path: &Path) -> Result<String, TableParseError> {
        let mut contents = String::new();
        let file = File::open(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(file).read_to_string(&mut contents)?;
        } else {
            let mut file = file;
            file.read_to_string(&mut contents)?;
        }
        Ok(contents)
    }
}
