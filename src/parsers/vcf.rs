// ==============================================================================
// parsers/vcf.rs - Core genome VCF parser
// ==============================================================================
// Description: Reads a multi-sample core genome VCF with noodles-vcf and counts
//              the isolates carrying each variant
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// References:
// - VCF 4.2 Spec: https://samtools.github.io/hts-specs/VCFv4.2.pdf
// - noodles-vcf: https://docs.rs/noodles-vcf/0.81.0/noodles_vcf/
// ==============================================================================
// Expected layout (one genotype column per isolate, 0 = reference allele):
//   #CHROM   POS  ID  REF  ALT  QUAL  FILTER  INFO  FORMAT  iso1  iso2  iso3
//   contig1  120  .   A    T    .     .       .     GT      1     0     1
// ==============================================================================

use flate2::read::MultiGzDecoder;
use noodles_vcf as vcf;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// One VCF position with the number of isolates carrying an alternate allele
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSite {
    /// Reference sequence name as written in the CHROM column
    pub contig: String,

    /// 1-based position on the contig
    pub position: u64,

    /// Isolates whose genotype holds a non-reference allele
    pub carriers: u64,
}

/// VCF parsing errors
#[derive(Error, Debug)]
pub enum VcfParseError {
    #[error("Failed to open VCF file: {0}")]
    FileOpenError(String),

    #[error("Failed to read VCF header: {0}")]
    HeaderError(String),

    #[error("Failed to parse VCF record {record}: {message}")]
    RecordError { record: usize, message: String },

    #[error("Missing required field in VCF record {record}: {field}")]
    MissingField { record: usize, field: &'static str },
}

/// Core genome VCF parser
pub struct VcfParser;

impl VcfParser {
    /// Parse a VCF file into per-position carrier counts
    ///
    /// # Arguments
    /// * `path` - Path to a `.vcf` or gzip/BGZF compressed `.vcf.gz`
    ///
    /// # Returns
    /// * `Ok(Vec<VariantSite>)` - One site per record, in file order
    /// * `Err(VcfParseError)` - Open, header or record error
    ///
    /// # Example
    /// ```no_run
    /// use report_annotator::parsers::VcfParser;
    ///
    /// let sites = VcfParser::parse("core.vcf")?;
    /// println!("Read {} variant sites", sites.len());
    /// # Ok::<(), report_annotator::parsers::VcfParseError>(())
    /// ```
    pub fn parse(path: impl AsRef<Path>) -> Result<Vec<VariantSite>, VcfParseError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| VcfParseError::FileOpenError(format!("{}: {}", path.display(), e)))?;

        // MultiGzDecoder reads both plain gzip and BGZF blocks
        let inner: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let sites = Self::read(inner)?;
        info!("Read {} variant sites from {:?}", sites.len(), path);
        Ok(sites)
    }

    /// Parse VCF text from any buffered reader
    pub fn read<R: BufRead>(inner: R) -> Result<Vec<VariantSite>, VcfParseError> {
        let mut reader = vcf::io::Reader::new(inner);

        let header = reader
            .read_header()
            .map_err(|e| VcfParseError::HeaderError(e.to_string()))?;
        debug!("VCF header lists {} samples", header.sample_names().len());

        let mut sites = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record_num = idx + 1;
            let record = result.map_err(|e| VcfParseError::RecordError {
                record: record_num,
                message: e.to_string(),
            })?;

            let position = match record.variant_start() {
                Some(Ok(pos)) => pos.get() as u64,
                Some(Err(e)) => {
                    return Err(VcfParseError::RecordError {
                        record: record_num,
                        message: format!("Failed to get position: {}", e),
                    })
                }
                None => {
                    return Err(VcfParseError::MissingField {
                        record: record_num,
                        field: "POS",
                    })
                }
            };

            let samples = record.samples();
            let raw_samples: &str = samples.as_ref();

            sites.push(VariantSite {
                contig: record.reference_sequence_name().to_string(),
                position,
                carriers: count_carriers(raw_samples),
            });
        }

        Ok(sites)
    }
}

/// Count samples carrying a non-reference allele.
///
/// `raw_samples` is the FORMAT column followed by the sample columns,
/// tab-separated. The GT field is used when FORMAT names it, otherwise the
/// first field. Missing calls (`.`) are not counted.
pub fn count_carriers(raw_samples: &str) -> u64 {
    let mut fields = raw_samples.split('\t');
    let Some(format) = fields.next().filter(|f| !f.is_empty()) else {
        return 0;
    };
    let gt_index = format.split(':').position(|key| key == "GT").unwrap_or(0);

    fields
        .filter(|sample| {
            sample
                .split(':')
                .nth(gt_index)
                .unwrap_or(".")
                .split(['/', '|'])
                .any(|allele| allele.parse::<u32>().is_ok_and(|a| a > 0))
        })
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const CORE_VCF: &str = "##fileformat=VCFv4.2\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tiso1\tiso2\tiso3\n\
contig1\t120\t.\tA\tT\t.\t.\t.\tGT\t1\t0\t1\n\
contig1\t450\t.\tG\tC\t.\t.\t.\tGT\t0\t1\t0\n\
contig2\t12\t.\tC\tA\t.\t.\t.\tGT\t0\t0\t0\n";

    #[test]
    fn test_count_carriers() {
        assert_eq!(count_carriers("GT\t1\t0\t1"), 2);
        assert_eq!(count_carriers("GT:DP\t0/1:30\t0/0:12\t1|1:8"), 2);
        assert_eq!(count_carriers("DP:GT\t30:0\t12:2"), 1);
        assert_eq!(count_carriers("GT\t.\t0"), 0);
        assert_eq!(count_carriers(""), 0);
    }

    #[test]
    fn test_read_core_vcf() {
        let sites = VcfParser::read(CORE_VCF.as_bytes()).unwrap();

        assert_eq!(sites.len(), 3);
        assert_eq!(
            sites[0],
            VariantSite {
                contig: "contig1".to_string(),
                position: 120,
                carriers: 2,
            }
        );
        assert_eq!(sites[1].carriers, 1);
        assert_eq!(sites[2].contig, "contig2");
        assert_eq!(sites[2].carriers, 0);
    }

    #[test]
    fn test_parse_plain_and_gzipped() {
        let mut plain = tempfile::Builder::new().suffix(".vcf").tempfile().unwrap();
        plain.write_all(CORE_VCF.as_bytes()).unwrap();
        plain.flush().unwrap();
        assert_eq!(VcfParser::parse(plain.path()).unwrap().len(), 3);

        let mut gzipped = tempfile::Builder::new().suffix(".vcf.gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CORE_VCF.as_bytes()).unwrap();
        gzipped.write_all(&encoder.finish().unwrap()).unwrap();
        gzipped.flush().unwrap();
        assert_eq!(
            VcfParser::parse(gzipped.path()).unwrap(),
            VcfParser::read(CORE_VCF.as_bytes()).unwrap()
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = VcfParser::parse(dir.path().join("core.vcf")).unwrap_err();
        assert!(matches!(err, VcfParseError::FileOpenError(_)));
    }
}
