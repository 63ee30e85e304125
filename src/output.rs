// ==============================================================================
// output.rs - Report Data Assembly
// ==============================================================================
// Description: Collects tables, distances, tree and annotations into the single
//              JSON document consumed by the HTML report renderer
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::annotation::{
    construct_annotations_with, AnnotationOptions, ColorScheme, Legend, MetadataTree, Palette,
};
use crate::config::TableConfig;
use crate::core_genome::{load_snp_density, SnpDensity};
use crate::models::ColumnSelector;
use crate::parsers::{load_tree_string, DistanceMatrix, PairwiseDistance};
use crate::tables::{count_unique_samples, ColumnDescriptor, ReportTables, TableSection};

/// Everything needed to assemble one report
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub title: String,
    pub description: String,
    pub author: String,
    pub background_color: String,
    pub font_color: String,
    /// Result tables shown as interactive tables
    pub filenames: Vec<PathBuf>,
    /// Newick tree
    pub tree: Option<PathBuf>,
    /// Metadata table used to colour tree tips
    pub annotate: Option<PathBuf>,
    pub annotate_cols: ColumnSelector,
    /// Pairwise SNP distance matrix
    pub distance_matrix: Option<PathBuf>,
    /// Core genome VCF for the SNP density plot
    pub core_genome: Option<PathBuf>,
    /// Summary table from the core genome run, shown as a report table
    pub core_genome_report: Option<PathBuf>,
    /// GenBank or FASTA reference the core genome was called against
    pub reference: Option<PathBuf>,
    /// Regions excluded from the core genome
    pub mask: Option<PathBuf>,
    /// Comments, column types and the classifier override set
    pub table_config: TableConfig,
    pub scheme: ColorScheme,
}

/// Report document handed to the renderer
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub title: String,
    pub description: String,
    pub background_color: String,
    pub font_color: String,
    pub user: String,
    pub date: String,
    pub num_isos: usize,
    pub phylo: String,
    pub tables: IndexMap<String, TableSection>,
    pub columns: IndexMap<String, Vec<ColumnDescriptor>>,
    pub comment: IndexMap<String, String>,
    pub newick: String,
    pub snp_distances: Vec<PairwiseDistance>,
    pub snp_histogram: BTreeMap<u64, usize>,
    /// `null` unless both a core genome VCF and a reference were given
    pub snp_density: Option<SnpDensity>,
    pub metadata_tree: MetadataTree,
    pub metadata_columns: Vec<String>,
    pub colors_css: Palette,
    pub legend: Legend,
}

/// Assemble the report document from its inputs
pub fn assemble_report(inputs: &ReportInputs) -> Result<ReportData> {
    info!("Generating summary report for {}", inputs.title);

    let mut table_files: Vec<&Path> = Vec::new();
    for path in &inputs.filenames {
        if path.exists() {
            table_files.push(path);
        } else {
            warn!("Input table {:?} does not exist, skipping", path);
        }
    }
    if let Some(matrix) = &inputs.distance_matrix {
        table_files.push(matrix);
    }
    if let Some(report) = &inputs.core_genome_report {
        table_files.push(report);
    }

    let mut tables = ReportTables::new();
    for path in &table_files {
        tables
            .add_file(path, &inputs.table_config)
            .with_context(|| format!("Failed to process table {:?}", path))?;
    }

    let num_isos = count_unique_samples(&inputs.filenames)
        .context("Failed to count samples across input tables")?;

    let (snp_distances, snp_histogram) = match &inputs.distance_matrix {
        Some(path) => {
            let matrix = DistanceMatrix::parse(path)
                .with_context(|| format!("Failed to read distance matrix {:?}", path))?;
            (matrix.pairwise(), matrix.histogram())
        }
        None => (Vec::new(), BTreeMap::new()),
    };

    let newick = match &inputs.tree {
        Some(path) => load_tree_string(path)
            .with_context(|| format!("Failed to read tree {:?}", path))?,
        None => String::new(),
    };

    let snp_density = match (&inputs.core_genome, &inputs.reference) {
        (Some(core_genome), Some(reference)) => Some(
            load_snp_density(core_genome, reference, inputs.mask.as_deref())
                .context("Failed to build core genome SNP density")?,
        ),
        (Some(_), None) => {
            warn!("A core genome VCF needs a reference for the SNP density plot, skipping");
            None
        }
        _ => None,
    };

    let options = AnnotationOptions {
        scheme: inputs.scheme,
        classifier: inputs.table_config.classifier.clone(),
    };
    let annotations = construct_annotations_with(
        inputs.annotate.as_deref(),
        &inputs.annotate_cols,
        &options,
    )
    .context("Failed to build tree annotations")?;

    let user = if inputs.author.is_empty() {
        "unknown".to_string()
    } else {
        inputs.author.clone()
    };
    let phylo = if inputs.tree.is_some() { "phylo" } else { "no_phylo" };

    info!(
        "Report assembled: {} tables, {} samples, {} annotated columns",
        tables.len(),
        num_isos,
        annotations.metadata_columns.len()
    );

    Ok(ReportData {
        title: inputs.title.clone(),
        description: inputs.description.clone(),
        background_color: inputs.background_color.clone(),
        font_color: inputs.font_color.clone(),
        user,
        date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        num_isos,
        phylo: phylo.to_string(),
        tables: tables.tables,
        columns: tables.columns,
        comment: tables.comments,
        newick,
        snp_distances,
        snp_histogram,
        snp_density,
        metadata_tree: annotations.metadata_tree,
        metadata_columns: annotations.metadata_columns,
        colors_css: annotations.colors_css,
        legend: annotations.legend,
    })
}

/// Output file for a report: title lowercased with ' ', ':' and '/' replaced
/// by '_', inside an existing directory
pub fn report_target(outdir: &Path, title: &str) -> Result<PathBuf> {
    if !outdir.exists() {
        anyhow::bail!("Output path {:?} does not exist", outdir);
    }
    let name = format!("{}.json", title.replace([' ', ':', '/'], "_").to_lowercase());
    Ok(outdir.join(name))
}

/// Write the report document as pretty-printed JSON
pub fn write_report(report: &ReportData, target: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(target, json).with_context(|| format!("Failed to write {:?}", target))?;
    info!("Report written to {:?}", target);
    Ok(())
}
