// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for report inputs (result tables, distances, trees,
//              core genome VCFs and reference genomes)
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod table;
pub mod distance;
pub mod tree;
pub mod vcf;
pub mod reference;

pub use table::{RawTable, TableParser, TableParseError};
pub use distance::{DistanceMatrix, DistanceParseError, PairwiseDistance};
pub use tree::load_tree_string;
pub use vcf::{VariantSite, VcfParseError, VcfParser};
pub use reference::{ContigSpan, ReferenceLayout, ReferenceParseError};
