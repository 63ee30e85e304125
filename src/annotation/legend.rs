// ==============================================================================
// legend.rs - Metadata Legend Builder
// ==============================================================================
// Description: Pairs each column's distinct values with palette keys
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use super::palette::Palette;
use crate::models::Dataset;

/// One legend swatch: a column value and its palette key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub value: String,
    pub color_key: String,
}

/// Rendered as a single-entry map, `{"<value>": "<color key>"}`
impl Serialize for LegendEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.value, &self.color_key)?;
        map.end()
    }
}

/// Column name -> ordered legend entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Legend {
    columns: IndexMap<String, Vec<LegendEntry>>,
}

impl Legend {
    /// Build the legend for each annotated column.
    ///
    /// The i-th distinct non-missing value takes the i-th palette key. When a
    /// column has more values than the palette has keys, the remaining
    /// values get no entry and render with the fallback colour.
    pub fn build(dataset: &Dataset, columns: &[String], palette: &Palette) -> Self {
        let mut legend = Self::default();
        for column in columns {
            let values: Vec<String> = dataset
                .distinct_values(column)
                .into_iter()
                .filter(|value| !value.is_missing())
                .map(|value| value.to_string())
                .collect();

            let entries: Vec<LegendEntry> = values
                .iter()
                .zip(palette.keys())
                .map(|(value, key)| LegendEntry {
                    value: value.clone(),
                    color_key: key.to_string(),
                })
                .collect();

            if entries.len() < values.len() {
                warn!(
                    "Column '{}' has {} values but only {} colours; {} values left out of the legend",
                    column,
                    values.len(),
                    palette.len(),
                    values.len() - entries.len()
                );
            }
            debug!("Legend for '{}': {} entries", column, entries.len());

            legend.columns.insert(column.clone(), entries);
        }
        legend
    }

    pub fn entries(&self, column: &str) -> Option<&[LegendEntry]> {
        self.columns.get(column).map(Vec::as_slice)
    }

    /// Palette key assigned to a value of a column, if any
    pub fn color_key(&self, column: &str, value: &str) -> Option<&str> {
        self.entries(column)?
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.color_key.as_str())
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
