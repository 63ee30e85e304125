// ==============================================================================
// tables.rs - Interactive Report Tables
// ==============================================================================
// Description: Turns result tables into column/row data for filterable report
//              tables, and counts distinct samples across inputs
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::TableConfig;
use crate::parsers::{RawTable, TableParseError, TableParser};

/// Filter widget shown in a column header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFilter {
    /// Minimum-value filter for numeric columns
    Number,
    /// Free-text search
    Input,
}

/// Column definition consumed by the table widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub title: String,
    pub field: String,
    #[serde(rename = "headerFilter")]
    pub header_filter: HeaderFilter,
    #[serde(rename = "headerFilterPlaceholder")]
    pub placeholder: String,
    #[serde(rename = "headerFilterFunc", skip_serializing_if = "Option::is_none")]
    pub filter_func: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(column: &str, header_filter: HeaderFilter) -> Self {
        let (placeholder, filter_func) = match header_filter {
            HeaderFilter::Number => ("At least...".to_string(), Some(">=".to_string())),
            HeaderFilter::Input => (format!("Search {}", column), None),
        };
        Self {
            title: column.to_string(),
            field: column.to_string(),
            header_filter,
            placeholder,
            filter_func,
        }
    }
}

/// One table in the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSection {
    pub link: String,
    pub name: String,
    /// Rows as `{"id": n, "<column>": "<value>", ...}`
    pub tables: Vec<IndexMap<String, Value>>,
}

/// All tables in the report, keyed by link
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTables {
    pub tables: IndexMap<String, TableSection>,
    pub columns: IndexMap<String, Vec<ColumnDescriptor>>,
    pub comments: IndexMap<String, String>,
}

/// Display title from a file name: stem before the first '.', with '_' and
/// '-' turned into spaces
pub fn table_title(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    stem.replace(['_', '-'], " ")
}

/// Anchor used to link to a table
pub fn table_link(title: &str) -> String {
    title.replace([' ', '_'], "-").to_lowercase()
}

/// `Number` when the table has rows and every value parses as a float,
/// otherwise `Input`
pub fn infer_header_filter(table: &RawTable, column_idx: usize) -> HeaderFilter {
    if table.records.is_empty() {
        return HeaderFilter::Input;
    }
    let all_numeric = table
        .records
        .iter()
        .all(|record| record.get(column_idx).is_some_and(|v| v.parse::<f64>().is_ok()));
    if all_numeric {
        HeaderFilter::Number
    } else {
        HeaderFilter::Input
    }
}

impl ReportTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a result table from disk and add it to the report
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        config: &TableConfig,
    ) -> Result<(), TableParseError> {
        let path = path.as_ref();
        info!("Processing table {:?}", path);
        let table = TableParser::read_raw(path)?;
        self.add_table(&table_title(path), &table, config);
        Ok(())
    }

    /// Add an already-loaded table. A table with the same link replaces the
    /// earlier one.
    pub fn add_table(&mut self, title: &str, table: &RawTable, config: &TableConfig) {
        let link = table_link(title);

        let descriptors: Vec<ColumnDescriptor> = table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let filter = config
                    .datatype(column)
                    .unwrap_or_else(|| infer_header_filter(table, idx));
                ColumnDescriptor::new(column, filter)
            })
            .collect();

        let rows: Vec<IndexMap<String, Value>> = table
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let mut row = IndexMap::with_capacity(record.len() + 1);
                row.insert("id".to_string(), Value::from(idx + 1));
                for (column, value) in table.headers.iter().zip(record) {
                    row.insert(column.clone(), Value::from(value.as_str()));
                }
                row
            })
            .collect();

        debug!(
            "Table '{}': {} columns, {} rows",
            link,
            descriptors.len(),
            rows.len()
        );

        self.comments
            .insert(link.clone(), config.comment(&link).to_string());
        self.columns.insert(link.clone(), descriptors);
        self.tables.insert(
            link.clone(),
            TableSection {
                link,
                name: title.to_string(),
                tables: rows,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Number of distinct sample identifiers (first column) across the tables
/// that exist and have at least one row
pub fn count_unique_samples<P: AsRef<Path>>(paths: &[P]) -> Result<usize, TableParseError> {
    let mut samples = IndexSet::new();
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Table {:?} not found, not counted", path);
            continue;
        }
        let table = TableParser::read_raw(path)?;
        samples.extend(table.identifiers().map(str::to_string));
    }
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_table(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_title_and_link() {
        let title = table_title(Path::new("/results/mlst_results-2024.summary.csv"));
        assert_eq!(title, "mlst results 2024");
        assert_eq!(table_link(&title), "mlst-results-2024");
        assert_eq!(table_link("Core_Genome Stats"), "core-genome-stats");
    }

    #[test]
    fn test_header_filter_inference() {
        let table = TableParser::read_str("ID,Coverage,Note\na,30.5,ok\nb,12,\n", b',').unwrap();

        assert_eq!(infer_header_filter(&table, 0), HeaderFilter::Input);
        assert_eq!(infer_header_filter(&table, 1), HeaderFilter::Number);
        assert_eq!(infer_header_filter(&table, 2), HeaderFilter::Input);
    }

    #[test]
    fn test_header_only_table_uses_input_filter() {
        let table = TableParser::read_str("ID,Coverage\n", b',').unwrap();

        assert!(table.records.is_empty());
        assert_eq!(infer_header_filter(&table, 0), HeaderFilter::Input);
        assert_eq!(infer_header_filter(&table, 1), HeaderFilter::Input);
    }

    #[test]
    fn test_column_descriptor_serialization() {
        let number = serde_json::to_value(ColumnDescriptor::new("Coverage", HeaderFilter::Number))
            .unwrap();
        assert_eq!(number["headerFilter"], "number");
        assert_eq!(number["headerFilterFunc"], ">=");
        assert_eq!(number["headerFilterPlaceholder"], "At least...");

        let input = serde_json::to_value(ColumnDescriptor::new("Host", HeaderFilter::Input)).unwrap();
        assert_eq!(input["headerFilter"], "input");
        assert_eq!(input["headerFilterPlaceholder"], "Search Host");
        assert!(input.get("headerFilterFunc").is_none());
    }

    #[test]
    fn test_add_table_rows_and_config() {
        let table = TableParser::read_str("ID,ST\niso1,131\niso2,73\n", b',').unwrap();
        let mut config = TableConfig::default();
        config.datatype.insert("ST".to_string(), HeaderFilter::Input);
        config
            .comments
            .insert("mlst".to_string(), "Sequence types".to_string());

        let mut tables = ReportTables::new();
        tables.add_table("mlst", &table, &config);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables.comments["mlst"], "Sequence types");
        assert_eq!(tables.columns["mlst"][1].header_filter, HeaderFilter::Input);

        let section = &tables.tables["mlst"];
        assert_eq!(section.name, "mlst");
        assert_eq!(section.tables.len(), 2);
        assert_eq!(section.tables[0]["id"], Value::from(1));
        assert_eq!(section.tables[1]["ST"], Value::from("73"));
    }

    #[test]
    fn test_add_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_table(&dir, "amr_genes.tsv", "ID\tGene\niso1\tblaTEM\n");

        let mut tables = ReportTables::new();
        tables.add_file(&path, &TableConfig::default()).unwrap();

        let section = &tables.tables["amr-genes"];
        assert_eq!(section.name, "amr genes");
        assert_eq!(tables.comments["amr-genes"], "");
    }

    #[test]
    fn test_count_unique_samples() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_table(&dir, "a.csv", "ID,ST\niso1,1\niso2,2\n");
        let second = write_table(&dir, "b.tsv", "Sample\tGene\niso2\tx\niso3\ty\n");
        let header_only = write_table(&dir, "c.csv", "ID,ST\n");
        let absent = dir.path().join("absent.csv");

        let count = count_unique_samples(&[first, second, header_only, absent]).unwrap();
        assert_eq!(count, 3);
    }
}
