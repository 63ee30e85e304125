// ==============================================================================
// lib.rs - Report Annotator Library
// ==============================================================================
// Description: Library interface for genomic report data assembly and tree
//              metadata annotation
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod models;
pub mod parsers;
pub mod annotation;
pub mod config;
pub mod tables;
pub mod core_genome;
pub mod output;
