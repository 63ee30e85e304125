// ==============================================================================
// annotation/mod.rs - Tree Metadata Annotation
// ==============================================================================
// Description: Builds colour tables, legends and per-sample metadata used to
//              annotate tree tips and table rows in the report
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Pipeline (strictly forward, each output built once):
//   metadata table -> classify columns -> palette -> legend -> metadata tree
// ==============================================================================

pub mod classifier;
pub mod palette;
pub mod legend;
pub mod metadata_tree;

pub use classifier::{classify, ClassifierConfig, DEFAULT_CATEGORICAL_OVERRIDES};
pub use legend::{Legend, LegendEntry};
pub use metadata_tree::{MetadataRecord, MetadataTree, FALLBACK_COLOUR};
pub use palette::{generate_colors, ColorScheme, Palette};

use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{ColumnSelector, Dataset};
use crate::parsers::{TableParseError, TableParser};

/// Errors that can occur while building annotations
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error(
        "None of the columns {} are in the metadata table. Please check the column names.",
        .requested.join(", ")
    )]
    InvalidColumns { requested: Vec<String> },

    #[error(
        "Columns {} do not contain any valid values - only non-numerical data can be included. Please check the column names.",
        .requested.join(", ")
    )]
    NoEligibleColumns { requested: Vec<String> },

    #[error("Failed to load metadata table: {0}")]
    Table(#[from] TableParseError),
}

/// Settings for one annotation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationOptions {
    pub scheme: ColorScheme,
    pub classifier: ClassifierConfig,
}

/// Everything the report renderer needs to colour tree tips
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Annotations {
    pub metadata_tree: MetadataTree,
    pub metadata_columns: Vec<String>,
    pub colors_css: Palette,
    pub legend: Legend,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        self.metadata_tree.is_empty()
            && self.metadata_columns.is_empty()
            && self.colors_css.is_empty()
            && self.legend.is_empty()
    }
}

/// Build annotations from a metadata table on disk with default options.
///
/// No path (or an empty one) yields empty annotations without reading
/// anything.
///
/// # Example
/// ```no_run
/// use report_annotator::annotation::construct_annotations;
/// use report_annotator::models::ColumnSelector;
/// use std::path::Path;
///
/// let annotations = construct_annotations(Some(Path::new("metadata.csv")), &ColumnSelector::All)?;
/// println!("Annotated columns: {:?}", annotations.metadata_columns);
/// # Ok::<(), report_annotator::annotation::AnnotationError>(())
/// ```
pub fn construct_annotations(
    path: Option<&Path>,
    selector: &ColumnSelector,
) -> Result<Annotations, AnnotationError> {
    construct_annotations_with(path, selector, &AnnotationOptions::default())
}

pub fn construct_annotations_with(
    path: Option<&Path>,
    selector: &ColumnSelector,
    options: &AnnotationOptions,
) -> Result<Annotations, AnnotationError> {
    let path = match path {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(Annotations::default()),
    };

    info!("Loading metadata table {:?}", path);
    let dataset = TableParser::parse(path)?;
    annotate_dataset(&dataset, selector, options)
}

/// Run classification, colour allocation, legend and tree construction over
/// an in-memory dataset
pub fn annotate_dataset(
    dataset: &Dataset,
    selector: &ColumnSelector,
    options: &AnnotationOptions,
) -> Result<Annotations, AnnotationError> {
    let metadata_columns = classify(selector, dataset, &options.classifier)?;
    let colors_css = Palette::allocate(dataset, &metadata_columns, options.scheme);
    let legend = Legend::build(dataset, &metadata_columns, &colors_css);
    let metadata_tree = MetadataTree::build(dataset, &metadata_columns, &legend, &colors_css);

    info!(
        "Annotated {} samples across {} columns ({} colours)",
        metadata_tree.len(),
        metadata_columns.len(),
        colors_css.len()
    );

    Ok(Annotations {
        metadata_tree,
        metadata_columns,
        colors_css,
        legend,
    })
}
