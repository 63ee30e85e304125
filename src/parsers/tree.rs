// ==============================================================================
// tree.rs - Newick Tree Loader
// ==============================================================================
// Description: Reads a phylogenetic tree file as a Newick string for the report
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::path::Path;
use tracing::warn;

/// Read a Newick tree as a trimmed string.
///
/// A missing file is not an error: the report simply has no tree.
pub fn load_tree_string(path: impl AsRef<Path>) -> std::io::Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Tree file {:?} not found, continuing without a tree", path);
        return Ok(String::new());
    }
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}
