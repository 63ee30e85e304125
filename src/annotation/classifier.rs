// ==============================================================================
// classifier.rs - Annotation Column Classifier
// ==============================================================================
// Description: Selects categorical columns that can be used for tree colouring
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Rules:
//   - The identifier (first) column is never annotated
//   - A column is categorical when none of its values are numeric
//   - Typing schemes (ST/MLST) are categorical even though they look numeric
// ==============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AnnotationError;
use crate::models::{ColumnSelector, Dataset};

/// Column names that are always categorical. `MSLT` is kept for tables
/// written by older pipeline versions.
pub const DEFAULT_CATEGORICAL_OVERRIDES: &[&str] = &["ST", "MLST", "MSLT"];

/// Classification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Columns treated as categorical regardless of content
    #[serde(default = "default_overrides")]
    pub categorical_overrides: Vec<String>,
}

fn default_overrides() -> Vec<String> {
    DEFAULT_CATEGORICAL_OVERRIDES
        .iter()
        .map(|name| name.to_string())
        .collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            categorical_overrides: default_overrides(),
        }
    }
}

impl ClassifierConfig {
    pub fn is_override(&self, column: &str) -> bool {
        self.categorical_overrides.iter().any(|c| c == column)
    }
}

/// True when no value in the column is numeric
pub fn is_categorical(dataset: &Dataset, column: &str) -> bool {
    dataset.column_values(column).all(|value| !value.is_numeric())
}

/// Resolve the selector against the dataset and keep the annotatable columns
///
/// # Returns
/// * `Ok(columns)` - Eligible columns, in dataset order for `All` and in the
///   caller's order for an explicit list
/// * `Err(AnnotationError::InvalidColumns)` - None of the named columns exist
/// * `Err(AnnotationError::NoEligibleColumns)` - Columns exist but are numeric
pub fn classify(
    selector: &ColumnSelector,
    dataset: &Dataset,
    config: &ClassifierConfig,
) -> Result<Vec<String>, AnnotationError> {
    let requested: Vec<String> = match selector {
        ColumnSelector::All => dataset.columns().to_vec(),
        ColumnSelector::Named(columns) => columns.clone(),
    };

    let mut candidates: Vec<&str> = Vec::new();
    for name in &requested {
        if !dataset.contains_column(name) {
            warn!("Annotation column '{}' not found in metadata table, skipping", name);
            continue;
        }
        if !candidates.contains(&name.as_str()) {
            candidates.push(name);
        }
    }

    if candidates.is_empty() {
        return Err(AnnotationError::InvalidColumns { requested });
    }

    let id_column = dataset.identifier_column();
    let mut eligible = Vec::new();
    for column in candidates {
        if Some(column) == id_column {
            continue;
        }
        if config.is_override(column) || is_categorical(dataset, column) {
            eligible.push(column.to_string());
        } else {
            debug!("Column '{}' is numeric, excluded from annotation", column);
        }
    }

    if eligible.is_empty() {
        return Err(AnnotationError::NoEligibleColumns { requested });
    }

    Ok(eligible)
}
