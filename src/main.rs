// ==============================================================================
// main.rs - Report Annotator Entry Point
// ==============================================================================
// Description: Collates result tables, SNP distances, core genome SNP density,
//              a tree and tree metadata into the JSON document rendered as
//              the summary report
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report_annotator::annotation::ColorScheme;
use report_annotator::config::TableConfig;
use report_annotator::models::ColumnSelector;
use report_annotator::output::{assemble_report, report_target, write_report, ReportInputs};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the report is written to
    #[arg(short, long, env = "REPORT_OUTPUT_DIR", default_value = ".")]
    output: PathBuf,

    /// Report title (also used for the file name)
    #[arg(long, default_value = "Summary report")]
    title: String,

    /// Free-text description shown under the title
    #[arg(long, default_value = "")]
    description: String,

    /// Report author
    #[arg(long, default_value = "")]
    author: String,

    /// Report background colour
    #[arg(long, default_value = "#ffffff")]
    background_color: String,

    /// Report font colour
    #[arg(long, default_value = "#000000")]
    font_color: String,

    /// Tabular result files; repeat for several (-f a.csv -f b.tsv)
    #[arg(short, long = "filename")]
    filenames: Vec<PathBuf>,

    /// Newick tree file
    #[arg(short, long)]
    tree: Option<PathBuf>,

    /// Metadata table for tree annotation (tip labels in the first column)
    #[arg(short, long)]
    annotate: Option<PathBuf>,

    /// Columns used for annotation: "all" or a comma separated list
    #[arg(long, default_value = "all")]
    annotate_cols: String,

    /// Pairwise SNP distance matrix (tab-delimited)
    #[arg(long)]
    distance_matrix: Option<PathBuf>,

    /// Core genome VCF used for the SNP density plot (requires --reference)
    #[arg(long)]
    core_genome: Option<PathBuf>,

    /// Core genome summary table, added to the report tables
    #[arg(long)]
    core_genome_report: Option<PathBuf>,

    /// Reference genome (GenBank or FASTA) for the SNP density plot
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Tab-separated mask of regions excluded from the core genome
    #[arg(short, long)]
    mask: Option<PathBuf>,

    /// JSON configuration (table comments, column datatypes, categorical
    /// override columns)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Colour scheme for annotation legends (tab20b, tab20 or tab10)
    #[arg(long, default_value = "tab20b")]
    scheme: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report_annotator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let scheme = args.scheme.parse::<ColorScheme>().unwrap_or_else(|e| {
        warn!("{}, using {}", e, ColorScheme::default());
        ColorScheme::default()
    });

    let table_config = match &args.config {
        Some(path) => TableConfig::load(path)
            .with_context(|| format!("Failed to load configuration {:?}", path))?,
        None => TableConfig::default(),
    };

    let annotate_cols = ColumnSelector::from(args.annotate_cols.as_str());

    let inputs = ReportInputs {
        title: args.title,
        description: args.description,
        author: args.author,
        background_color: args.background_color,
        font_color: args.font_color,
        filenames: args.filenames,
        tree: args.tree,
        annotate: args.annotate,
        annotate_cols,
        distance_matrix: args.distance_matrix,
        core_genome: args.core_genome,
        core_genome_report: args.core_genome_report,
        reference: args.reference,
        mask: args.mask,
        table_config,
        scheme,
    };

    let target = report_target(&args.output, &inputs.title)?;
    info!("Output will be saved to {:?}", target);

    let report = assemble_report(&inputs)?;
    write_report(&report, &target)?;

    Ok(())
}
