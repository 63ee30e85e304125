// ==============================================================================
// models.rs - Tabular Dataset Models
// ==============================================================================
// Description: Tagged cell values, in-memory tables and column selectors
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Placeholder written in place of absent cells
pub const MISSING_VALUE: &str = "NA";

/// Raw strings that load as a missing cell
const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "N/A"];

/// A single table cell, tagged at load time
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Free text (categorical candidate)
    Text(String),
    /// Whole number
    Integer(i64),
    /// Finite floating point number
    Float(f64),
    /// Absent value, displayed as "NA"
    Missing,
}

impl CellValue {
    /// Tag a raw field from a delimited file
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return CellValue::Missing;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return CellValue::Integer(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Float(value),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// True for the missing tag and for text that still carries the placeholder
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Text(text) => text == MISSING_VALUE,
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(value) => write!(f, "{}", value),
            // Keep a trailing ".0" so 1.0 and 1 stay distinct labels
            CellValue::Float(value) if value.fract() == 0.0 => write!(f, "{:.1}", value),
            CellValue::Float(value) => write!(f, "{}", value),
            CellValue::Missing => f.write_str(MISSING_VALUE),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CellValue::Text(text) => serializer.serialize_str(text),
            CellValue::Integer(value) => serializer.serialize_i64(*value),
            CellValue::Float(value) => serializer.serialize_f64(*value),
            CellValue::Missing => serializer.serialize_str(MISSING_VALUE),
        }
    }
}

/// Ordered columns and rows; the first column holds the primary identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset from raw strings, tagging every cell
    ///
    /// # Example
    /// ```
    /// use report_annotator::models::{CellValue, Dataset};
    ///
    /// let dataset = Dataset::from_raw(&["ID", "ST"], &[&["A", "131"], &["B", ""]]);
    /// assert_eq!(dataset.len(), 2);
    /// assert_eq!(dataset.cell(1, "ST"), Some(&CellValue::Missing));
    /// ```
    pub fn from_raw(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut dataset = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            dataset.push_row(row.iter().map(|raw| CellValue::parse(raw)).collect());
        }
        dataset
    }

    /// Append a row. Short rows are padded with missing cells and long rows
    /// are truncated to the column count.
    pub fn push_row(&mut self, mut cells: Vec<CellValue>) {
        cells.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of the join-key column
    pub fn identifier_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Every cell of a column in row order (empty when the column is unknown)
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let idx = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Distinct cells of a column in first-seen row order
    pub fn distinct_values(&self, column: &str) -> Vec<&CellValue> {
        let mut seen = HashSet::new();
        self.column_values(column)
            .filter(|value| seen.insert(value.to_string()))
            .collect()
    }
}

/// Which columns a caller wants annotated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelector {
    /// Every column in the dataset
    #[default]
    All,
    /// An explicit, ordered list of column names
    Named(Vec<String>),
}

impl ColumnSelector {
    pub fn named<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSelector::Named(columns.into_iter().map(Into::into).collect())
    }
}

/// `all` or a comma separated list of column names
impl From<&str> for ColumnSelector {
    fn from(s: &str) -> Self {
        if s.trim() == "all" {
            return ColumnSelector::All;
        }
        ColumnSelector::Named(
            s.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl FromStr for ColumnSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::All => f.write_str("all"),
            ColumnSelector::Named(columns) => f.write_str(&columns.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parse_tags() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse(" 2.5 "), CellValue::Float(2.5));
        assert_eq!(CellValue::parse("ST131"), CellValue::text("ST131"));
        assert_eq!(CellValue::parse(""), CellValue::Missing);
        assert_eq!(CellValue::parse("NA"), CellValue::Missing);
        assert_eq!(CellValue::parse("inf"), CellValue::text("inf"));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Integer(7).to_string(), "7");
        assert_eq!(CellValue::Float(1.0).to_string(), "1.0");
        assert_eq!(CellValue::Float(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Missing.to_string(), "NA");
    }

    #[test]
    fn test_cell_serializes_raw() {
        let json = serde_json::to_string(&vec![
            CellValue::text("X"),
            CellValue::Integer(3),
            CellValue::Missing,
        ])
        .unwrap();
        assert_eq!(json, r#"["X",3,"NA"]"#);
    }

    #[test]
    fn test_missing_detection() {
        assert!(CellValue::Missing.is_missing());
        assert!(CellValue::text("NA").is_missing());
        assert!(!CellValue::text("N").is_missing());
        assert!(!CellValue::Integer(0).is_missing());
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let dataset = Dataset::from_raw(
            &["ID", "Cat"],
            &[&["a", "Y"], &["b", "X"], &["c", "Y"], &["d", ""], &["e", "Z"]],
        );

        let distinct: Vec<String> = dataset
            .distinct_values("Cat")
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(distinct, vec!["Y", "X", "NA", "Z"]);
        assert!(dataset.distinct_values("Nope").is_empty());
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut dataset = Dataset::new(vec!["ID".to_string(), "Cat".to_string()]);
        dataset.push_row(vec![CellValue::text("A")]);
        assert_eq!(dataset.cell(0, "Cat"), Some(&CellValue::Missing));
        assert_eq!(dataset.identifier_column(), Some("ID"));
    }

    #[test]
    fn test_column_selector_parse() {
        assert_eq!("all".parse::<ColumnSelector>().unwrap(), ColumnSelector::All);
        assert_eq!(
            "ST, Country,,Host".parse::<ColumnSelector>().unwrap(),
            ColumnSelector::named(["ST", "Country", "Host"])
        );
        assert_eq!(ColumnSelector::named(["a", "b"]).to_string(), "a, b");
    }
}
