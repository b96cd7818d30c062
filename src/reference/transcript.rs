//! Transcript and exon models
//!
//! # Coordinate System
//!
//! All coordinates in this module are **1-based inclusive genomic** positions:
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `Exon.start`, `Exon.stop` | 1-based | Genomic coordinates (inclusive) |
//! | `TranscriptModel.tx` | 1-based | Whole transcript extent (inclusive) |
//! | `TranscriptModel.cds` | 1-based | CDS extent, start and stop codons included |
//!
//! Exons are always kept in ascending genomic order regardless of strand.
//! A transcript is coding when `cds.0 < cds.1`; non-coding models carry an
//! empty CDS such as `(tx.1 + 1, tx.1)`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::FerroError;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    /// Parse `"+"` / `"-"`.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// An exon of a transcript model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    /// Genomic start position (1-based, inclusive)
    pub start: u64,
    /// Genomic stop position (1-based, inclusive)
    pub stop: u64,
    /// Reading frame at the exon's first coding base, `None` for UTR-only exons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<u8>,
}

impl Exon {
    /// Create a new exon without frame information
    pub fn new(start: u64, stop: u64) -> Self {
        Self {
            start,
            stop,
            frame: None,
        }
    }

    /// Create a new exon with a known frame
    pub fn with_frame(start: u64, stop: u64, frame: u8) -> Self {
        Self {
            start,
            stop,
            frame: Some(frame),
        }
    }

    /// Length of the exon in bases
    pub fn len(&self) -> u64 {
        self.stop + 1 - self.start
    }

    /// Check if the exon is empty
    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }

    /// Check if a position falls within this exon
    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos <= self.stop
    }

    /// Check if `[start, stop]` intersects this exon
    pub fn overlaps(&self, start: u64, stop: u64) -> bool {
        start <= self.stop && stop >= self.start
    }
}

/// A contiguous genomic interval (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start: u64,
    pub stop: u64,
}

impl Region {
    pub fn new(start: u64, stop: u64) -> Self {
        Self { start, stop }
    }

    /// Length of the region in bases
    pub fn len(&self) -> u64 {
        (self.stop + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.stop < self.start
    }
}

fn total_length(regions: &[Region]) -> u64 {
    regions.iter().map(Region::len).sum()
}

/// One transcript's exon/CDS geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptModel {
    /// Gene symbol (e.g., "KLHL17")
    pub gene: String,
    /// Unique transcript identifier (e.g., "NM_198317_1")
    pub transcript_id: String,
    /// Transcript name as given by the source, before any de-duplication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tr_name: Option<String>,
    /// Chromosome name
    pub chrom: String,
    /// Strand orientation
    pub strand: Strand,
    /// Transcript extent
    pub tx: (u64, u64),
    /// CDS extent
    pub cds: (u64, u64),
    /// Exons in ascending genomic order
    pub exons: Vec<Exon>,
    /// Free-form attributes (e.g. `anticodonB` / `anticodonE` for tRNA genes)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl TranscriptModel {
    /// Create a new transcript model
    pub fn new(
        gene: impl Into<String>,
        transcript_id: impl Into<String>,
        chrom: impl Into<String>,
        strand: Strand,
        tx: (u64, u64),
        cds: (u64, u64),
        exons: Vec<Exon>,
    ) -> Self {
        Self {
            gene: gene.into(),
            transcript_id: transcript_id.into(),
            tr_name: None,
            chrom: chrom.into(),
            strand,
            tx,
            cds,
            exons,
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute parsed as an integer
    pub fn attribute_u64(&self, key: &str) -> Option<u64> {
        self.attributes.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Check the structural invariants of the model
    pub fn validate(&self) -> Result<(), FerroError> {
        let invalid = |msg: String| FerroError::InvalidTranscript {
            id: self.transcript_id.clone(),
            msg,
        };

        if self.exons.is_empty() {
            return Err(invalid("transcript has no exons".to_string()));
        }
        if self.tx.0 > self.tx.1 {
            return Err(invalid(format!(
                "transcript start {} after end {}",
                self.tx.0, self.tx.1
            )));
        }
        for exon in &self.exons {
            if exon.start == 0 || exon.is_empty() {
                return Err(invalid(format!(
                    "bad exon {}-{}",
                    exon.start, exon.stop
                )));
            }
        }
        for pair in self.exons.windows(2) {
            if pair[1].start <= pair[0].stop {
                return Err(invalid(format!(
                    "exons {}-{} and {}-{} overlap or are out of order",
                    pair[0].start, pair[0].stop, pair[1].start, pair[1].stop
                )));
            }
        }
        if self.is_coding() {
            let covered = |pos: u64| self.exons.iter().any(|e| e.contains(pos));
            if !covered(self.cds.0) || !covered(self.cds.1) {
                return Err(invalid(format!(
                    "CDS {}-{} not covered by exons",
                    self.cds.0, self.cds.1
                )));
            }
        }
        Ok(())
    }

    /// Check if this is a protein-coding transcript
    pub fn is_coding(&self) -> bool {
        self.cds.0 < self.cds.1
    }

    /// First exonic base
    pub fn exonic_start(&self) -> u64 {
        self.exons.first().map_or(self.tx.0, |e| e.start)
    }

    /// Last exonic base
    pub fn exonic_stop(&self) -> u64 {
        self.exons.last().map_or(self.tx.1, |e| e.stop)
    }

    /// The CDS clipped to exons, in genomic order
    pub fn cds_regions(&self) -> Vec<Region> {
        if !self.is_coding() {
            return Vec::new();
        }
        let (cds_start, cds_stop) = self.cds;
        self.exons
            .iter()
            .filter(|e| e.overlaps(cds_start, cds_stop))
            .map(|e| Region::new(e.start.max(cds_start), e.stop.min(cds_stop)))
            .collect()
    }

    // Exonic pieces strictly before `cds.0`.
    fn regions_before_cds(&self) -> Vec<Region> {
        self.exons
            .iter()
            .filter(|e| e.start < self.cds.0)
            .map(|e| Region::new(e.start, e.stop.min(self.cds.0 - 1)))
            .collect()
    }

    // Exonic pieces strictly after `cds.1`.
    fn regions_after_cds(&self) -> Vec<Region> {
        self.exons
            .iter()
            .filter(|e| e.stop > self.cds.1)
            .map(|e| Region::new(e.start.max(self.cds.1 + 1), e.stop))
            .collect()
    }

    /// Exonic 5' UTR pieces, in genomic order
    pub fn utr5_regions(&self) -> Vec<Region> {
        if !self.is_coding() {
            return Vec::new();
        }
        match self.strand {
            Strand::Plus => self.regions_before_cds(),
            Strand::Minus => self.regions_after_cds(),
        }
    }

    /// Exonic 3' UTR pieces, in genomic order
    pub fn utr3_regions(&self) -> Vec<Region> {
        if !self.is_coding() {
            return Vec::new();
        }
        match self.strand {
            Strand::Plus => self.regions_after_cds(),
            Strand::Minus => self.regions_before_cds(),
        }
    }

    /// All exonic regions, the 5'-most extended upstream by `promoter_len`
    pub fn all_regions(&self, promoter_len: u64) -> Vec<Region> {
        let mut regions: Vec<Region> = self
            .exons
            .iter()
            .map(|e| Region::new(e.start, e.stop))
            .collect();
        if promoter_len > 0 {
            match self.strand {
                Strand::Plus => {
                    if let Some(first) = regions.first_mut() {
                        first.start = first.start.saturating_sub(promoter_len).max(1);
                    }
                }
                Strand::Minus => {
                    if let Some(last) = regions.last_mut() {
                        last.stop += promoter_len;
                    }
                }
            }
        }
        regions
    }

    /// Total exonic length
    pub fn total_len(&self) -> u64 {
        self.exons.iter().map(Exon::len).sum()
    }

    /// Coding length, stop codon included
    pub fn cds_len(&self) -> u64 {
        total_length(&self.cds_regions())
    }

    pub fn utr5_len(&self) -> u64 {
        total_length(&self.utr5_regions())
    }

    pub fn utr3_len(&self) -> u64 {
        total_length(&self.utr3_regions())
    }

    /// Number of introns between exons
    pub fn intron_count(&self) -> usize {
        self.exons.len().saturating_sub(1)
    }

    /// Compute each exon's reading frame from the CDS.
    ///
    /// The frame of an exon is the number of coding bases upstream of it (in
    /// transcript orientation) modulo 3. Exons without coding bases get `None`.
    pub fn calc_frames(&self) -> Vec<Option<u8>> {
        let n = self.exons.len();
        let mut frames = vec![None; n];
        if !self.is_coding() {
            return frames;
        }

        let (cds_start, cds_stop) = self.cds;
        let mut upstream: u64 = 0;
        let mut assign = |idx: usize, exon: &Exon, upstream: &mut u64| {
            if exon.overlaps(cds_start, cds_stop) {
                frames[idx] = Some((*upstream % 3) as u8);
                let coding = exon.stop.min(cds_stop) + 1 - exon.start.max(cds_start);
                *upstream += coding;
            }
        };

        match self.strand {
            Strand::Plus => {
                for (idx, exon) in self.exons.iter().enumerate() {
                    assign(idx, exon, &mut upstream);
                }
            }
            Strand::Minus => {
                for (idx, exon) in self.exons.iter().enumerate().rev() {
                    assign(idx, exon, &mut upstream);
                }
            }
        }
        frames
    }

    /// Overwrite the exon frames with [`Self::calc_frames`]
    pub fn update_frames(&mut self) {
        let frames = self.calc_frames();
        for (exon, frame) in self.exons.iter_mut().zip(frames) {
            exon.frame = frame;
        }
    }

    /// Check that the stored frames agree with the CDS
    pub fn frames_consistent(&self) -> bool {
        self.exons
            .iter()
            .zip(self.calc_frames())
            .all(|(exon, frame)| exon.frame == frame)
    }

    /// Strand-aware 1-based number of the first exon intersecting
    /// `[start, stop]`, or 0 when none does
    pub fn exon_number_for(&self, start: u64, stop: u64) -> usize {
        let n = self.exons.len();
        self.exons
            .iter()
            .position(|e| e.overlaps(start, stop))
            .map_or(0, |idx| match self.strand {
                Strand::Plus => idx + 1,
                Strand::Minus => n - idx,
            })
    }
}
