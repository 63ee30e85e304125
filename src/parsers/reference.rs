// ==============================================================================
// parsers/reference.rs - Reference genome layout
// ==============================================================================
// Description: Contig lengths and concatenated offsets from a GenBank or FASTA
//              reference, used to place per-contig positions on one axis
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use flate2::read::GzDecoder;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Contigs at or below this length get no break marker
pub const MIN_BREAK_CONTIG_LENGTH: u64 = 5000;

#[derive(Error, Debug)]
pub enum ReferenceParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("FASTA parsing error: {0}")]
    FastaError(String),

    #[error("Reference is neither GenBank nor FASTA")]
    UnknownFormat,

    #[error("Reference contains no sequences")]
    NoSequences,
}

/// Placement of one contig on the concatenated genome axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContigSpan {
    /// Bases preceding this contig
    pub offset: u64,
    pub length: u64,
}

/// Contigs in file order, keyed by accession without its version suffix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceLayout {
    contigs: IndexMap<String, ContigSpan>,
    total_length: u64,
}

/// `NC_000913.3` -> `NC_000913`
pub fn contig_key(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}

impl ReferenceLayout {
    /// Lay out contigs end to end in the given order
    pub fn from_lengths<I, S>(lengths: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut layout = Self::default();
        for (id, length) in lengths {
            layout.push(id.as_ref(), length);
        }
        layout
    }

    fn push(&mut self, id: &str, length: u64) {
        // A repeated accession keeps its slot but the axis still advances
        self.contigs.insert(
            contig_key(id).to_string(),
            ContigSpan {
                offset: self.total_length,
                length,
            },
        );
        self.total_length += length;
    }

    /// Load a GenBank or FASTA reference, optionally gzipped
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReferenceParseError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = Vec::new();
        if path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(file).read_to_end(&mut contents)?;
        } else {
            file.read_to_end(&mut contents)?;
        }

        let layout = Self::parse_bytes(contents)?;
        info!(
            "Reference {:?}: {} contigs, {} bp",
            path,
            layout.len(),
            layout.total_length()
        );
        Ok(layout)
    }

    /// Detect the format from the first non-blank line and parse
    pub fn parse_bytes(contents: Vec<u8>) -> Result<Self, ReferenceParseError> {
        let first_line = contents
            .split(|b| *b == b'\n')
            .map(|line| String::from_utf8_lossy(line).trim().to_string())
            .find(|line| !line.is_empty())
            .ok_or(ReferenceParseError::NoSequences)?;

        let layout = if first_line.starts_with("LOCUS") {
            Self::parse_genbank(&String::from_utf8_lossy(&contents))
        } else if first_line.starts_with('>') {
            Self::parse_fasta(contents)?
        } else {
            return Err(ReferenceParseError::UnknownFormat);
        };

        if layout.is_empty() {
            return Err(ReferenceParseError::NoSequences);
        }
        Ok(layout)
    }

    /// GenBank flat file. The record id is the VERSION accession (falling
    /// back to the LOCUS name) and the length is the ORIGIN base count
    /// (falling back to the LOCUS length).
    fn parse_genbank(text: &str) -> Self {
        let mut layout = Self::default();
        let mut id: Option<String> = None;
        let mut locus_length = 0u64;
        let mut bases = 0u64;
        let mut in_origin = false;

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("LOCUS") {
                let tokens: Vec<&str> = rest.split_whitespace().collect();
                id = tokens.first().map(|name| name.to_string());
                locus_length = tokens
                    .windows(2)
                    .find(|pair| pair[1] == "bp" || pair[1] == "aa")
                    .and_then(|pair| pair[0].parse().ok())
                    .unwrap_or(0);
                bases = 0;
                in_origin = false;
            } else if let Some(rest) = line.strip_prefix("VERSION") {
                if let Some(version) = rest.split_whitespace().next() {
                    id = Some(version.to_string());
                }
            } else if line.starts_with("ORIGIN") {
                in_origin = true;
            } else if line.starts_with("//") {
                if let Some(record_id) = id.take() {
                    let length = if bases > 0 { bases } else { locus_length };
                    debug!("GenBank record {}: {} bp", record_id, length);
                    layout.push(&record_id, length);
                }
                in_origin = false;
            } else if in_origin {
                bases += line.chars().filter(char::is_ascii_alphabetic).count() as u64;
            }
        }

        // Final record without a terminator
        if let Some(record_id) = id {
            let length = if bases > 0 { bases } else { locus_length };
            layout.push(&record_id, length);
        }
        layout
    }

    /// FASTA via needletail; the id is the first word of the header line
    fn parse_fasta(contents: Vec<u8>) -> Result<Self, ReferenceParseError> {
        let mut layout = Self::default();
        let mut reader = needletail::parse_fastx_reader(Cursor::new(contents))
            .map_err(|e| ReferenceParseError::FastaError(e.to_string()))?;

        while let Some(record) = reader.next() {
            let record = record.map_err(|e| ReferenceParseError::FastaError(e.to_string()))?;
            let header = String::from_utf8_lossy(record.id()).to_string();
            let id = header.split_whitespace().next().unwrap_or_default().to_string();
            let length = record.seq().len() as u64;
            debug!("FASTA record {}: {} bp", id, length);
            layout.push(&id, length);
        }
        Ok(layout)
    }

    /// Look up a contig by exact key, then by the name without its version
    pub fn get(&self, name: &str) -> Option<&ContigSpan> {
        self.contigs
            .get(name)
            .or_else(|| self.contigs.get(contig_key(name)))
    }

    /// Concatenated-axis end of every contig longer than 5 kb
    pub fn contig_breaks(&self) -> Vec<u64> {
        self.contigs
            .values()
            .filter(|span| span.length > MIN_BREAK_CONTIG_LENGTH)
            .map(|span| span.offset + span.length)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContigSpan)> {
        self.contigs.iter().map(|(name, span)| (name.as_str(), span))
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}
