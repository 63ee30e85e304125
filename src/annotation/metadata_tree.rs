// ==============================================================================
// metadata_tree.rs - Per-Sample Metadata Tree
// ==============================================================================
// Description: Resolves every sample's annotation values to display colours
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use super::legend::Legend;
use super::palette::Palette;
use crate::models::{CellValue, Dataset};

/// Colour used for values without a legend entry (including "NA")
pub const FALLBACK_COLOUR: &str = "white";

/// Colour and label for one sample/column pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataRecord {
    pub colour: String,
    pub label: CellValue,
}

/// Sample identifier -> column -> record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataTree {
    samples: IndexMap<String, IndexMap<String, MetadataRecord>>,
}

impl MetadataTree {
    /// Build one record per row, keyed by the identifier column. A repeated
    /// identifier replaces the earlier row's record.
    pub fn build(
        dataset: &Dataset,
        columns: &[String],
        legend: &Legend,
        palette: &Palette,
    ) -> Self {
        let mut tree = Self::default();
        let Some(id_column) = dataset.identifier_column() else {
            return tree;
        };

        // Column positions resolved once; unknown names are skipped
        let targets: Vec<(&str, usize)> = columns
            .iter()
            .filter(|column| column.as_str() != id_column)
            .filter_map(|column| {
                dataset
                    .column_index(column)
                    .map(|idx| (column.as_str(), idx))
            })
            .collect();

        let mut duplicates = 0usize;
        for row in dataset.rows() {
            let sample_id = row[0].to_string();

            let mut records = IndexMap::with_capacity(targets.len());
            for &(column, idx) in &targets {
                let label = row[idx].clone();
                let colour = legend
                    .color_key(column, &label.to_string())
                    .and_then(|key| palette.get(key))
                    .unwrap_or(FALLBACK_COLOUR)
                    .to_string();
                records.insert(column.to_string(), MetadataRecord { colour, label });
            }

            if tree.samples.insert(sample_id, records).is_some() {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            warn!(
                "{} duplicate identifiers in '{}'; later rows replaced earlier ones",
                duplicates, id_column
            );
        }
        tree
    }

    /// All records for a sample
    pub fn get(&self, sample_id: &str) -> Option<&IndexMap<String, MetadataRecord>> {
        self.samples.get(sample_id)
    }

    pub fn record(&self, sample_id: &str, column: &str) -> Option<&MetadataRecord> {
        self.get(sample_id)?.get(column)
    }

    pub fn sample_ids(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
