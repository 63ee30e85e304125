// ==============================================================================
// distance.rs - Pairwise SNP Distance Matrix Parser
// ==============================================================================
// Description: Parser for square SNP distance matrices with long-form melting
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Tab-delimited square matrix (e.g. snp-dists output)
// Example:
//   snp-dists 0.8.2	iso1	iso2	iso3
//   iso1	0	4	12
//   iso2	4	0	9
//   iso3	12	9	0
// ==============================================================================

use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during distance matrix parsing
#[derive(Error, Debug)]
pub enum DistanceParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Distance matrix is empty")]
    EmptyMatrix,

    #[error("Invalid distance '{value}' for {isolate} vs {other}")]
    InvalidDistance {
        isolate: String,
        other: String,
        value: String,
    },

    #[error("Row {isolate} has {found} distances, expected {expected}")]
    RaggedRow {
        isolate: String,
        expected: usize,
        found: usize,
    },
}

/// One off-diagonal cell of the matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairwiseDistance {
    #[serde(rename = "Isolate")]
    pub isolate: String,
    pub variable: String,
    pub value: u64,
}

/// Square SNP distance matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    /// Column isolate names (header minus the corner cell)
    pub names: Vec<String>,
    /// Row isolate name with its distances, aligned with `names`
    pub rows: Vec<(String, Vec<u64>)>,
}

impl DistanceMatrix {
    /// Parse a tab-delimited distance matrix
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, DistanceParseError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let matrix = Self::parse_str(&contents)?;
        info!(
            "Loaded {}x{} distance matrix from {:?}",
            matrix.rows.len(),
            matrix.names.len(),
            path.as_ref()
        );
        Ok(matrix)
    }

    pub fn parse_str(contents: &str) -> Result<Self, DistanceParseError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(contents.as_bytes());

        let names: Vec<String> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(|h| h.trim().to_string())
            .collect();
        if names.is_empty() {
            return Err(DistanceParseError::EmptyMatrix);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let isolate = record.get(0).unwrap_or_default().trim().to_string();
            let fields: Vec<&str> = record.iter().skip(1).collect();
            if fields.len() != names.len() {
                return Err(DistanceParseError::RaggedRow {
                    isolate,
                    expected: names.len(),
                    found: fields.len(),
                });
            }

            let mut distances = Vec::with_capacity(fields.len());
            for (other, raw) in names.iter().zip(fields) {
                let value = raw.trim().parse::<u64>().map_err(|_| {
                    DistanceParseError::InvalidDistance {
                        isolate: isolate.clone(),
                        other: other.clone(),
                        value: raw.to_string(),
                    }
                })?;
                distances.push(value);
            }
            rows.push((isolate, distances));
        }

        if rows.is_empty() {
            return Err(DistanceParseError::EmptyMatrix);
        }

        Ok(Self { names, rows })
    }

    /// Melt to long form, column by column, dropping self-comparisons
    pub fn pairwise(&self) -> Vec<PairwiseDistance> {
        let mut pairs = Vec::new();
        for (col_idx, variable) in self.names.iter().enumerate() {
            for (isolate, distances) in &self.rows {
                if isolate == variable {
                    continue;
                }
                pairs.push(PairwiseDistance {
                    isolate: isolate.clone(),
                    variable: variable.clone(),
                    value: distances[col_idx],
                });
            }
        }
        pairs
    }

    /// Number of pairs observed at each distance, ascending
    pub fn histogram(&self) -> BTreeMap<u64, usize> {
        let mut counts = BTreeMap::new();
        for pair in self.pairwise() {
            *counts.entry(pair.value).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = "snp-dists 0.8.2\tiso1\tiso2\tiso3
iso1\t0\t4\t12
iso2\t4\t0\t9
iso3\t12\t9\t0
";

    #[test]
    fn test_parse_matrix() {
        let matrix = DistanceMatrix::parse_str(MATRIX).unwrap();
        assert_eq!(matrix.names, vec!["iso1", "iso2", "iso3"]);
        assert_eq!(matrix.rows.len(), 3);
        assert_eq!(matrix.rows[2], ("iso3".to_string(), vec![12, 9, 0]));
    }

    #[test]
    fn test_pairwise_drops_diagonal() {
        let matrix = DistanceMatrix::parse_str(MATRIX).unwrap();
        let pairs = matrix.pairwise();

        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|p| p.isolate != p.variable));
        // Melted column by column
        assert_eq!(pairs[0].isolate, "iso2");
        assert_eq!(pairs[0].variable, "iso1");
        assert_eq!(pairs[0].value, 4);
    }

    #[test]
    fn test_histogram_counts_both_directions() {
        let matrix = DistanceMatrix::parse_str(MATRIX).unwrap();
        let histogram = matrix.histogram();

        assert_eq!(histogram.get(&4), Some(&2));
        assert_eq!(histogram.get(&9), Some(&2));
        assert_eq!(histogram.get(&12), Some(&2));
        assert_eq!(histogram.get(&0), None);
    }

    #[test]
    fn test_invalid_distance() {
        let result = DistanceMatrix::parse_str("x\ta\tb\na\t0\tNA\nb\t1\t0\n");
        match result.unwrap_err() {
            DistanceParseError::InvalidDistance { isolate, other, value } => {
                assert_eq!(isolate, "a");
                assert_eq!(other, "b");
                assert_eq!(value, "NA");
            }
            other => panic!("Expected InvalidDistance error, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row() {
        let result = DistanceMatrix::parse_str("x\ta\tb\na\t0\n");
        assert!(matches!(
            result.unwrap_err(),
            DistanceParseError::RaggedRow { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn test_empty_matrix() {
        assert!(matches!(
            DistanceMatrix::parse_str("x\n").unwrap_err(),
            DistanceParseError::EmptyMatrix
        ));
    }

    #[test]
    fn test_pairwise_serializes_isolate_key() {
        let pair = PairwiseDistance {
            isolate: "a".to_string(),
            variable: "b".to_string(),
            value: 3,
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"{"Isolate":"a","variable":"b","value":3}"#);
    }
}
