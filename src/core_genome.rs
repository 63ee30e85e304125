// ==============================================================================
// core_genome.rs - Core Genome SNP Density
// ==============================================================================
// Description: Places core genome variants on the concatenated reference axis,
//              flags masked regions and bins counts for the density plot
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Layout:
//   absolute position = contig offset + VCF position
//   bins              = max(total length / 3000, 1), equal width
//   contig breaks     = end of every contig longer than 5 kb
// Mask file (tab-separated, no header, 1-based inclusive):
//   NC_000913   1200   1850
// ==============================================================================

use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::parsers::{
    ReferenceLayout, ReferenceParseError, VariantSite, VcfParseError, VcfParser,
};

/// Reference bases per density bin
pub const BASES_PER_BIN: u64 = 3000;

/// Bar colour for positions inside a masked region
pub const MASKED_COLOUR: &str = "#d9dcde";

/// Bar colour for everything else
pub const UNMASKED_COLOUR: &str = "#216cb8";

#[derive(Error, Debug)]
pub enum CoreGenomeError {
    #[error("File {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("VCF error: {0}")]
    Vcf(#[from] VcfParseError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceParseError),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid mask row at line {line}: {message}")]
    InvalidMask { line: usize, message: String },
}

/// Masked regions on the concatenated axis, sorted and inclusive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedRegions {
    intervals: Vec<(u64, u64)>,
}

impl MaskedRegions {
    /// Load a BED-style mask. Rows naming a contig missing from the
    /// reference are skipped.
    pub fn load(path: impl AsRef<Path>, layout: &ReferenceLayout) -> Result<Self, CoreGenomeError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mask = Self::parse_str(&contents, layout)?;
        info!("Masking {} regions from {:?}", mask.len(), path);
        Ok(mask)
    }

    pub fn parse_str(contents: &str, layout: &ReferenceLayout) -> Result<Self, CoreGenomeError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(contents.as_bytes());

        let mut intervals = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = idx + 1;
            if record.len() < 3 {
                return Err(CoreGenomeError::InvalidMask {
                    line,
                    message: format!("expected 3 fields, found {}", record.len()),
                });
            }

            let contig = record[0].trim();
            let parse_coord = |raw: &str| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| CoreGenomeError::InvalidMask {
                        line,
                        message: format!("'{}' is not a position", raw),
                    })
            };
            let start = parse_coord(&record[1])?;
            let end = parse_coord(&record[2])?;

            let Some(span) = layout.get(contig) else {
                warn!("Mask contig '{}' not in reference, skipping line {}", contig, line);
                continue;
            };
            intervals.push((start.min(end) + span.offset, start.max(end) + span.offset));
        }

        intervals.sort_unstable();
        Ok(Self { intervals })
    }

    pub fn contains(&self, position: u64) -> bool {
        // Last interval starting at or before the position
        let idx = self.intervals.partition_point(|&(start, _)| start <= position);
        self.intervals[..idx]
            .iter()
            .rev()
            .any(|&(start, end)| start <= position && position <= end)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskState {
    Masked,
    Unmasked,
}

/// Variant count at one absolute position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensitySite {
    #[serde(rename = "index")]
    pub position: u64,
    #[serde(rename = "vars")]
    pub variants: u64,
    pub mask: MaskState,
}

/// Summed variant counts over one equal-width bin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DensityBin {
    pub start: u64,
    pub end: u64,
    pub unmasked: u64,
    pub masked: u64,
}

/// Plot data for variants along the core genome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnpDensity {
    pub total_length: u64,
    pub max_bins: u64,
    pub bin_width: u64,
    pub contig_breaks: Vec<u64>,
    pub sites: Vec<DensitySite>,
    pub bins: Vec<DensityBin>,
    pub masked_colour: String,
    pub unmasked_colour: String,
}

/// Bin count for a genome length, at least one
pub fn max_bins(total_length: u64) -> u64 {
    let bins = total_length / BASES_PER_BIN;
    if bins == 0 {
        warn!(
            "Reference is only {} bp, using a single density bin",
            total_length
        );
    }
    bins.max(1)
}

impl SnpDensity {
    /// Sum carriers per absolute position, flag masked positions and bin
    pub fn build(layout: &ReferenceLayout, sites: &[VariantSite], mask: &MaskedRegions) -> Self {
        let mut counts: BTreeMap<u64, u64> = BTreeMap::new();
        let mut unplaced = 0usize;
        for site in sites.iter().filter(|site| site.carriers > 0) {
            match layout.get(&site.contig) {
                Some(span) => {
                    *counts.entry(site.position + span.offset).or_insert(0) += site.carriers
                }
                None => unplaced += 1,
            }
        }
        if unplaced > 0 {
            warn!("{} variant sites on contigs missing from the reference", unplaced);
        }

        let sites: Vec<DensitySite> = counts
            .into_iter()
            .map(|(position, variants)| DensitySite {
                position,
                variants,
                mask: if mask.contains(position) {
                    MaskState::Masked
                } else {
                    MaskState::Unmasked
                },
            })
            .collect();

        let total_length = layout.total_length();
        let max_bins = max_bins(total_length);
        let bin_width = total_length.div_ceil(max_bins).max(1);
        let bin_count = total_length.div_ceil(bin_width);

        let mut bins: Vec<DensityBin> = (0..bin_count)
            .map(|i| DensityBin {
                start: i * bin_width + 1,
                end: ((i + 1) * bin_width).min(total_length),
                unmasked: 0,
                masked: 0,
            })
            .collect();
        if let Some(last) = bins.len().checked_sub(1) {
            for site in &sites {
                let idx = (site.position.saturating_sub(1) / bin_width).min(last as u64) as usize;
                match site.mask {
                    MaskState::Masked => bins[idx].masked += site.variants,
                    MaskState::Unmasked => bins[idx].unmasked += site.variants,
                }
            }
        }

        debug!(
            "Density: {} sites in {} bins of {} bp",
            sites.len(),
            bins.len(),
            bin_width
        );

        Self {
            total_length,
            max_bins,
            bin_width,
            contig_breaks: layout.contig_breaks(),
            sites,
            bins,
            masked_colour: MASKED_COLOUR.to_string(),
            unmasked_colour: UNMASKED_COLOUR.to_string(),
        }
    }

    pub fn total_variants(&self) -> u64 {
        self.sites.iter().map(|site| site.variants).sum()
    }
}

/// Read the core genome VCF, reference and optional mask and build the
/// density data. A mask path that does not exist is ignored.
pub fn load_snp_density(
    core_genome: &Path,
    reference: &Path,
    mask: Option<&Path>,
) -> Result<SnpDensity, CoreGenomeError> {
    for path in [core_genome, reference] {
        if !path.exists() {
            return Err(CoreGenomeError::NotFound(path.to_path_buf()));
        }
    }

    let layout = ReferenceLayout::load(reference)?;
    let sites = VcfParser::parse(core_genome)?;

    let mask = match mask {
        Some(path) if path.exists() => MaskedRegions::load(path, &layout)?,
        Some(path) => {
            warn!("Mask file {:?} not found, density is unmasked", path);
            MaskedRegions::default()
        }
        None => MaskedRegions::default(),
    };

    let density = SnpDensity::build(&layout, &sites, &mask);
    info!(
        "SNP density: {} variants at {} positions across {} bp",
        density.total_variants(),
        density.sites.len(),
        density.total_length
    );
    Ok(density)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn site(contig: &str, position: u64, carriers: u64) -> VariantSite {
        VariantSite {
            contig: contig.to_string(),
            position,
            carriers,
        }
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_max_bins() {
        assert_eq!(max_bins(4_641_652), 1547);
        assert_eq!(max_bins(2999), 1);
        assert_eq!(max_bins(0), 1);
    }

    #[test]
    fn test_mask_offsets_and_lookup() {
        let layout = ReferenceLayout::from_lengths([("chr", 10_000), ("plasmid.1", 6000)]);
        let rows = "chr\t100\t200\nplasmid\t10\t20\nghost\t1\t5\n";
        let mask = MaskedRegions::parse_str(rows, &layout).unwrap();

        assert_eq!(mask.len(), 2);
        assert!(mask.contains(100));
        assert!(mask.contains(200));
        assert!(!mask.contains(201));
        assert!(mask.contains(10_015));
        assert!(!mask.contains(15));
    }

    #[test]
    fn test_invalid_mask_row() {
        let layout = ReferenceLayout::from_lengths([("chr", 1000)]);
        let err = MaskedRegions::parse_str("chr\tstart\t20\n", &layout).unwrap_err();
        assert!(matches!(err, CoreGenomeError::InvalidMask { line: 1, .. }));
    }

    #[test]
    fn test_build_offsets_and_bins() {
        let layout = ReferenceLayout::from_lengths([("chr", 6000), ("plasmid", 3000)]);
        let sites = vec![
            site("chr", 10, 2),
            site("chr", 10, 1),
            site("chr", 5999, 1),
            site("plasmid", 5, 3),
            site("chr", 40, 0),
            site("unknown", 1, 4),
        ];

        let density = SnpDensity::build(&layout, &sites, &MaskedRegions::default());

        assert_eq!(density.total_length, 9000);
        assert_eq!(density.max_bins, 3);
        assert_eq!(density.bin_width, 3000);
        assert_eq!(density.contig_breaks, vec![6000]);

        let positions: Vec<(u64, u64)> = density
            .sites
            .iter()
            .map(|s| (s.position, s.variants))
            .collect();
        assert_eq!(positions, vec![(10, 3), (5999, 1), (6005, 3)]);

        let bins: Vec<(u64, u64, u64)> = density
            .bins
            .iter()
            .map(|b| (b.start, b.end, b.unmasked))
            .collect();
        assert_eq!(bins, vec![(1, 3000, 3), (3001, 6000, 1), (6001, 9000, 3)]);
        assert_eq!(density.total_variants(), 7);
    }

    #[test]
    fn test_masked_sites_are_flagged() {
        let layout = ReferenceLayout::from_lengths([("chr", 6000)]);
        let mask = MaskedRegions::parse_str("chr\t1\t50\n", &layout).unwrap();
        let density = SnpDensity::build(&layout, &[site("chr", 20, 2), site("chr", 80, 1)], &mask);

        assert_eq!(density.sites[0].mask, MaskState::Masked);
        assert_eq!(density.sites[1].mask, MaskState::Unmasked);
        assert_eq!(density.bins[0].masked, 2);
        assert_eq!(density.bins[0].unmasked, 1);

        let json = serde_json::to_value(&density.sites[0]).unwrap();
        assert_eq!(json, serde_json::json!({"index": 20, "vars": 2, "mask": "masked"}));
    }

    #[test]
    fn test_load_snp_density() {
        let dir = tempfile::tempdir().unwrap();
        let reference = write_file(&dir, "ref.fasta", ">contig1.1\nACGTACGTAC\n>contig2\nACGT\n");
        let vcf = write_file(
            &dir,
            "core.vcf",
            "##fileformat=VCFv4.2\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tiso1\tiso2\n\
contig1\t3\t.\tG\tA\t.\t.\t.\tGT\t1\t1\n\
contig2\t2\t.\tC\tT\t.\t.\t.\tGT\t0\t1\n",
        );
        let mask = write_file(&dir, "mask.bed", "contig2\t1\t4\n");

        let density = load_snp_density(&vcf, &reference, Some(mask.as_path())).unwrap();

        assert_eq!(density.total_length, 14);
        assert_eq!(density.bins.len(), 1);
        assert_eq!(density.sites.len(), 2);
        assert_eq!(density.sites[0].mask, MaskState::Unmasked);
        assert_eq!(density.sites[1].position, 12);
        assert_eq!(density.sites[1].mask, MaskState::Masked);

        let absent = dir.path().join("absent.bed");
        let unmasked = load_snp_density(&vcf, &reference, Some(absent.as_path())).unwrap();
        assert!(unmasked.sites.iter().all(|s| s.mask == MaskState::Unmasked));
    }

    #[test]
    fn test_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let reference = write_file(&dir, "ref.fasta", ">c\nACGT\n");
        let err = load_snp_density(&dir.path().join("core.vcf"), &reference, None).unwrap_err();
        assert!(matches!(err, CoreGenomeError::NotFound(_)));
    }
}
