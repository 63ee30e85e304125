// ==============================================================================
// palette.rs - Categorical Colour Palette
// ==============================================================================
// Description: Deterministic colour generation and the CSS colour table
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   For n requested colours from a listed scheme of N entries, sample the
//   positions 0, 1/(n-1), ..., 1 and map position p to entry
//   min(floor(p * N), N - 1). Integer arithmetic only, no shared state, so
//   the same (scheme, n) always yields the same colours on every platform.
// ==============================================================================

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::models::Dataset;

const TAB20B: &[&str] = &[
    "#393b79", "#5254a3", "#6b6ecf", "#9c9ede", "#637939", "#8ca252", "#b5cf6b", "#cedb9c",
    "#8c6d31", "#bd9e39", "#e7ba52", "#e7cb94", "#843c39", "#ad494a", "#d6616b", "#e7969c",
    "#7b4173", "#a55194", "#ce6dbd", "#de9ed6",
];

const TAB20: &[&str] = &[
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

const TAB10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown colour scheme '{0}' (expected tab20b, tab20 or tab10)")]
pub struct UnknownSchemeError(pub String);

/// Listed categorical colour schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorScheme {
    #[default]
    Tab20b,
    Tab20,
    Tab10,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Tab20b => "tab20b",
            ColorScheme::Tab20 => "tab20",
            ColorScheme::Tab10 => "tab10",
        }
    }

    /// The scheme's colours as lowercase `#rrggbb` codes
    pub fn colors(&self) -> &'static [&'static str] {
        match self {
            ColorScheme::Tab20b => TAB20B,
            ColorScheme::Tab20 => TAB20,
            ColorScheme::Tab10 => TAB10,
        }
    }
}

impl FromStr for ColorScheme {
    type Err = UnknownSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tab20b" => Ok(ColorScheme::Tab20b),
            "tab20" => Ok(ColorScheme::Tab20),
            "tab10" => Ok(ColorScheme::Tab10),
            _ => Err(UnknownSchemeError(s.to_string())),
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sample `count` evenly spaced colours from a scheme
///
/// # Examples
/// ```
/// use report_annotator::annotation::palette::{generate_colors, ColorScheme};
///
/// let colors = generate_colors(ColorScheme::Tab20b, 3);
/// assert_eq!(colors, vec!["#393b79", "#e7ba52", "#de9ed6"]);
/// ```
pub fn generate_colors(scheme: ColorScheme, count: usize) -> Vec<String> {
    let table = scheme.colors();
    let size = table.len();
    match count {
        0 => Vec::new(),
        1 => vec![table[0].to_string()],
        _ => (0..count)
            .map(|i| {
                let idx = (i * size / (count - 1)).min(size - 1);
                table[idx].to_string()
            })
            .collect(),
    }
}

/// Key used for a colour in the CSS table (`#393b79` -> `a393b79`)
pub fn color_key(color: &str) -> String {
    color.replace('#', "a")
}

/// Ordered colour table: key -> colour code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    colors: IndexMap<String, String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate colours for every annotated column and merge them,
    /// deduplicated by colour, in first-generated order
    pub fn allocate(dataset: &Dataset, columns: &[String], scheme: ColorScheme) -> Self {
        let mut palette = Self::new();
        for column in columns {
            let distinct = dataset.distinct_values(column).len();
            let colors = generate_colors(scheme, distinct);
            debug!(
                "Column '{}': {} distinct values, {} colours from {}",
                column,
                distinct,
                colors.len(),
                scheme
            );
            for color in &colors {
                palette.insert(color);
            }
        }
        palette
    }

    /// Add a colour if it is not already present, returning its key
    pub fn insert(&mut self, color: &str) -> String {
        let key = color_key(color);
        self.colors
            .entry(key.clone())
            .or_insert_with(|| color.to_string());
        key
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.colors.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_single_color() {
        assert_eq!(generate_colors(ColorScheme::Tab20b, 1), vec!["#393b79"]);
        assert!(generate_colors(ColorScheme::Tab20b, 0).is_empty());
    }

    #[test]
    fn test_generate_spans_scheme() {
        let colors = generate_colors(ColorScheme::Tab20b, 20);
        assert_eq!(colors.len(), 20);
        assert_eq!(colors[0], "#393b79");
        assert_eq!(colors[19], "#de9ed6");
    }

    #[test]
    fn test_generate_more_than_scheme_repeats() {
        let colors = generate_colors(ColorScheme::Tab10, 25);
        assert_eq!(colors.len(), 25);

        let mut unique = colors.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_generate_is_deterministic() {
        for scheme in [ColorScheme::Tab20b, ColorScheme::Tab20, ColorScheme::Tab10] {
            for n in 0..40 {
                assert_eq!(generate_colors(scheme, n), generate_colors(scheme, n));
            }
        }
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("tab20b".parse::<ColorScheme>().unwrap(), ColorScheme::Tab20b);
        assert_eq!("TAB10".parse::<ColorScheme>().unwrap(), ColorScheme::Tab10);
        assert!("viridis".parse::<ColorScheme>().is_err());
        assert_eq!(ColorScheme::Tab20.to_string(), "tab20");
    }

    #[test]
    fn test_color_key() {
        assert_eq!(color_key("#393b79"), "a393b79");
    }

    #[test]
    fn test_allocate_deduplicates_across_columns() {
        let dataset = Dataset::from_raw(
            &["ID", "Country", "Host"],
            &[&["A", "UK", "cow"], &["B", "FR", "pig"], &["C", "UK", "cow"]],
        );
        let columns = vec!["Country".to_string(), "Host".to_string()];

        let palette = Palette::allocate(&dataset, &columns, ColorScheme::Tab20b);

        // Both columns request the same two colours
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.keys().collect::<Vec<_>>(), vec!["a393b79", "ade9ed6"]);
        assert_eq!(palette.get("ade9ed6"), Some("#de9ed6"));
    }

    #[test]
    fn test_allocate_counts_missing_values() {
        let dataset = Dataset::from_raw(
            &["ID", "Host"],
            &[&["A", "cow"], &["B", ""], &["C", "pig"]],
        );

        let palette = Palette::allocate(&dataset, &["Host".to_string()], ColorScheme::Tab20b);
        assert_eq!(
            palette.keys().collect::<Vec<_>>(),
            vec!["a393b79", "ae7ba52", "ade9ed6"]
        );
    }

    #[test]
    fn test_allocate_is_order_stable() {
        let dataset = Dataset::from_raw(&["ID", "C"], &[&["A", "x"], &["B", "y"]]);
        let columns = vec!["C".to_string()];

        let first = Palette::allocate(&dataset, &columns, ColorScheme::Tab20b);
        let _other = Palette::allocate(&dataset, &columns, ColorScheme::Tab10);
        let second = Palette::allocate(&dataset, &columns, ColorScheme::Tab20b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_palette_serializes_as_map() {
        let mut palette = Palette::new();
        palette.insert("#393b79");
        palette.insert("#393b79");
        palette.insert("#e7ba52");

        let json = serde_json::to_string(&palette).unwrap();
        assert_eq!(json, r##"{"a393b79":"#393b79","ae7ba52":"#e7ba52"}"##);
    }
}
