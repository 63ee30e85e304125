// ==============================================================================
// annotation_example.rs - Example of Tree Annotation
// ==============================================================================
// Description: Builds tip colours and legends from a small metadata table
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use report_annotator::annotation::{construct_annotations, generate_colors, ColorScheme};
use report_annotator::models::ColumnSelector;
use std::io::Write;
use tempfile::Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tree Annotation Example ===\n");

    // Metadata keyed by tip label in the first column
    let mut temp_file = Builder::new().suffix(".csv").tempfile()?;
    writeln!(temp_file, "ID,ST,Country,Depth")?;
    writeln!(temp_file, "iso1,131,UK,31.5")?;
    writeln!(temp_file, "iso2,73,France,28.0")?;
    writeln!(temp_file, "iso3,131,,44.2")?;
    writeln!(temp_file, "iso4,95,UK,19.9")?;
    temp_file.flush()?;

    println!("Created temporary metadata file: {:?}\n", temp_file.path());

    println!("--- tab20b, 5 colours ---");
    for color in generate_colors(ColorScheme::Tab20b, 5) {
        println!("  {}", color);
    }

    println!("\nAnnotating all columns...");
    let annotations = construct_annotations(Some(temp_file.path()), &ColumnSelector::All)?;
    println!(
        "✓ Annotated columns: {}\n",
        annotations.metadata_columns.join(", ")
    );

    println!("--- Legend ---");
    for column in annotations.legend.columns() {
        println!("{}:", column);
        for entry in annotations.legend.entries(column).unwrap_or_default() {
            println!("  {:<10} {}", entry.value, entry.color_key);
        }
    }

    println!("\n--- Tip colours ---");
    println!("{:<8} {:<10} {:<10}", "Tip", "ST", "Country");
    println!("{:-<30}", "");
    for sample in annotations.metadata_tree.sample_ids() {
        let colour = |column: &str| {
            annotations
                .metadata_tree
                .record(sample, column)
                .map(|record| record.colour.clone())
                .unwrap_or_default()
        };
        println!("{:<8} {:<10} {:<10}", sample, colour("ST"), colour("Country"));
    }

    println!("\n--- Requesting a numeric column ---");
    match construct_annotations(
        Some(temp_file.path()),
        &ColumnSelector::named(["Depth"]),
    ) {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("✗ {}", e),
    }

    println!("\n--- Report JSON ---");
    println!("{}", serde_json::to_string_pretty(&annotations)?);

    Ok(())
}
