//! In-memory genome and transcript index for testing

use crate::error::FerroError;
use crate::reference::provider::{SequenceAccessor, TranscriptIndex};
use crate::reference::transcript::{Exon, Strand, TranscriptModel};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Shape of the JSON document accepted by [`MockProvider::from_json`]
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MockData {
    #[serde(default)]
    sequences: HashMap<String, String>,
    #[serde(default)]
    transcripts: Vec<TranscriptModel>,
}

/// Mock provider serving both the genome and the transcript index from memory
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    /// Chromosome sequences, upper-case
    sequences: HashMap<String, String>,
    /// Transcripts in insertion order
    transcripts: Vec<TranscriptModel>,
}

// Background sequence of the test genome; position p holds FILLER[(p - 1) % 10].
const FILLER: &[u8] = b"TCAGGCATTC";

fn filler(len: usize) -> Vec<u8> {
    (0..len).map(|i| FILLER[i % FILLER.len()]).collect()
}

fn put(seq: &mut [u8], start: usize, bases: &str) {
    seq[start - 1..start - 1 + bases.len()].copy_from_slice(bases.as_bytes());
}

impl MockProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Load sequences and transcripts from a JSON file
    ///
    /// ```json
    /// {"sequences": {"1": "ACGT..."}, "transcripts": [{...}]}
    /// ```
    pub fn from_json(path: &Path) -> Result<Self, FerroError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse the JSON document directly
    pub fn from_json_str(content: &str) -> Result<Self, FerroError> {
        let data: MockData = serde_json::from_str(content)?;
        let mut provider = Self::new();
        for (chrom, seq) in data.sequences {
            provider.add_sequence(chrom, seq);
        }
        for tm in data.transcripts {
            provider.add_transcript(tm)?;
        }
        Ok(provider)
    }

    /// Add a chromosome sequence
    pub fn add_sequence(&mut self, chrom: impl Into<String>, sequence: impl Into<String>) {
        self.sequences
            .insert(chrom.into(), sequence.into().to_ascii_uppercase());
    }

    /// Add a transcript model, validating it first
    pub fn add_transcript(&mut self, transcript: TranscriptModel) -> Result<(), FerroError> {
        transcript.validate()?;
        self.transcripts.push(transcript);
        Ok(())
    }

    /// Create a provider with a small synthetic genome
    ///
    /// Chromosome `1` (600 bp) carries:
    /// - `TXP1` (`GENEP`, +): exons 11-30, 61-90, 121-160; CDS 21-128 (15 aa)
    /// - `TXM1` (`GENEM`, -): exons 201-230, 251-270, 291-320; CDS 216-300 (14 aa)
    /// - `TXN1` (`NCGENE`, +): non-coding, exons 401-420, 441-460
    /// - `TXT1` (`tRNA1`, -): tRNA, exon 501-572, anticodon 534-536
    ///
    /// Chromosome `3` (200 bp) carries `TXU1` (`GENEU`, +): exons 11-20, 41-60,
    /// 81-100, 121-140; CDS 46-95 (9 aa), so it has introns in both UTRs.
    ///
    /// Chromosome `MT` (60 bp) carries `MTX1` (`MTGENE`, +) with CDS 1-30
    /// starting on an `ATA` codon. Chromosome `2` (100 bp) has no transcripts.
    pub fn with_test_data() -> Self {
        let mut chr1 = filler(600);
        // GENEP coding sequence: ATG AAA CCC GGG TTT ACG TGG CAG GAT CTG AGC ATC GCA TGC GAG TAA
        put(&mut chr1, 21, "ATGAAACCCG");
        put(&mut chr1, 61, "GGTTTACGTGGCAGGATCTGAGCATCGCAT");
        put(&mut chr1, 121, "GCGAGTAA");
        // GENEM coding sequence, reverse complemented:
        // ATG CGT GAA CTC AAG TGC GGA CCT TTC AGT GCG ATT TAC CAG TGA
        put(&mut chr1, 216, "TCACTGGTAAATCGC");
        put(&mut chr1, 251, "ACTGAAAGGTCCGCACTTGA");
        put(&mut chr1, 291, "GTTCACGCAT");

        let mut chr3 = filler(200);
        // ATG GCT GCA AAA GGA TTT CCC TGG AGC TAA
        put(&mut chr3, 46, "ATGGCTGCAAAAGGA");
        put(&mut chr3, 81, "TTTCCCTGGAGCTAA");

        let mut mt = filler(60);
        // ATA TGA AAA CCC GGG TTT ACT GCA TTA TAA
        put(&mut mt, 1, "ATATGAAAACCCGGGTTTACTGCATTATAA");

        let mut provider = Self::new();
        provider.add_sequence("1", String::from_utf8_lossy(&chr1));
        provider.add_sequence("MT", String::from_utf8_lossy(&mt));
        provider.add_sequence("2", String::from_utf8_lossy(&filler(100)));
        provider.add_sequence("3", String::from_utf8_lossy(&chr3));

        let models = vec![
            TranscriptModel::new(
                "GENEP",
                "TXP1",
                "1",
                Strand::Plus,
                (11, 160),
                (21, 128),
                vec![Exon::new(11, 30), Exon::new(61, 90), Exon::new(121, 160)],
            ),
            TranscriptModel::new(
                "GENEM",
                "TXM1",
                "1",
                Strand::Minus,
                (201, 320),
                (216, 300),
                vec![Exon::new(201, 230), Exon::new(251, 270), Exon::new(291, 320)],
            ),
            TranscriptModel::new(
                "NCGENE",
                "TXN1",
                "1",
                Strand::Plus,
                (401, 460),
                (461, 460),
                vec![Exon::new(401, 420), Exon::new(441, 460)],
            ),
            TranscriptModel::new(
                "tRNA1",
                "TXT1",
                "1",
                Strand::Minus,
                (501, 572),
                (573, 572),
                vec![Exon::new(501, 572)],
            )
            .with_attribute("anticodonB", "534")
            .with_attribute("anticodonE", "536"),
            TranscriptModel::new(
                "GENEU",
                "TXU1",
                "3",
                Strand::Plus,
                (11, 140),
                (46, 95),
                vec![
                    Exon::new(11, 20),
                    Exon::new(41, 60),
                    Exon::new(81, 100),
                    Exon::new(121, 140),
                ],
            ),
            TranscriptModel::new(
                "MTGENE",
                "MTX1",
                "MT",
                Strand::Plus,
                (1, 30),
                (1, 30),
                vec![Exon::new(1, 30)],
            ),
        ];

        for mut tm in models {
            tm.update_frames();
            provider.transcripts.push(tm);
        }
        provider
    }

    /// Get the number of transcripts
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    /// Check if provider is empty
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Iterate over all transcripts
    pub fn transcripts(&self) -> impl Iterator<Item = &TranscriptModel> {
        self.transcripts.iter()
    }
}

impl SequenceAccessor for MockProvider {
    fn get(&self, chrom: &str, start: u64, end: u64) -> Result<String, FerroError> {
        if end < start {
            return Ok(String::new());
        }
        let seq = self
            .sequences
            .get(chrom)
            .ok_or_else(|| FerroError::sequence_access(chrom, start, end, "unknown chromosome"))?;
        if start == 0 || end > seq.len() as u64 {
            return Err(FerroError::sequence_access(
                chrom,
                start,
                end,
                format!("outside chromosome of length {}", seq.len()),
            ));
        }
        Ok(seq[(start - 1) as usize..end as usize].to_string())
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        self.sequences.contains_key(chrom)
    }

    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        self.sequences.get(chrom).map(|s| s.len() as u64)
    }
}

impl TranscriptIndex for MockProvider {
    fn overlapping(&self, chrom: &str, start: u64, end: u64) -> Vec<&TranscriptModel> {
        let mut hits: Vec<&TranscriptModel> = self
            .transcripts
            .iter()
            .filter(|tm| tm.chrom == chrom && tm.tx.0 <= end && tm.tx.1 >= start)
            .collect();
        hits.sort_by_key(|tm| tm.tx.0);
        hits
    }

    fn has_chromosome(&self, chrom: &str) -> bool {
        self.transcripts.iter().any(|tm| tm.chrom == chrom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_data_sequences() {
        let provider = MockProvider::with_test_data();
        assert_eq!(provider.get("1", 21, 23).unwrap(), "ATG");
        assert_eq!(provider.get("1", 126, 128).unwrap(), "TAA");
        // GENEM start codon sits at 298-300 on the reverse strand.
        assert_eq!(provider.get("1", 298, 300).unwrap(), "CAT");
        assert_eq!(provider.get("1", 216, 218).unwrap(), "TCA");
        assert_eq!(provider.get("1", 1, 10).unwrap(), "TCAGGCATTC");
        assert_eq!(provider.get("MT", 1, 3).unwrap(), "ATA");
        assert_eq!(provider.get("1", 10, 9).unwrap(), "");
    }

    #[test]
    fn test_out_of_range() {
        let provider = MockProvider::with_test_data();
        assert!(matches!(
            provider.get("1", 599, 601),
            Err(FerroError::SequenceAccess { .. })
        ));
        assert!(provider.get("7", 1, 1).is_err());
        assert!(provider.get("1", 0, 1).is_err());
    }

    #[test]
    fn test_chromosomes() {
        let provider = MockProvider::with_test_data();
        assert!(SequenceAccessor::has_chromosome(&provider, "2"));
        assert!(!TranscriptIndex::has_chromosome(&provider, "2"));
        assert!(TranscriptIndex::has_chromosome(&provider, "MT"));
        assert_eq!(provider.chromosome_length("1"), Some(600));
    }

    #[test]
    fn test_overlapping() {
        let provider = MockProvider::with_test_data();
        let ids: Vec<&str> = provider
            .overlapping("1", 150, 210)
            .iter()
            .map(|tm| tm.transcript_id.as_str())
            .collect();
        assert_eq!(ids, vec!["TXP1", "TXM1"]);
        assert!(provider.overlapping("1", 161, 200).is_empty());
        assert_eq!(provider.overlapping("1", 1, 600).len(), 4);
    }

    #[test]
    fn test_frames_computed() {
        let provider = MockProvider::with_test_data();
        let txp1 = provider.transcripts().next().unwrap();
        assert_eq!(txp1.exons[0].frame, Some(0));
        assert_eq!(txp1.exons[1].frame, Some(1));
        assert_eq!(txp1.exons[2].frame, Some(1));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "sequences": {"chrX": "acgtacgtac"},
            "transcripts": [{
                "gene": "G",
                "transcript_id": "T1",
                "chrom": "chrX",
                "strand": "-",
                "tx": [2, 9],
                "cds": [3, 8],
                "exons": [{"start": 2, "stop": 9}]
            }]
        }"#;
        let provider = MockProvider::from_json_str(json).unwrap();
        assert_eq!(provider.len(), 1);
        assert_eq!(provider.get("chrX", 1, 4).unwrap(), "ACGT");
        assert_eq!(provider.overlapping("chrX", 5, 5)[0].strand, Strand::Minus);
    }

    #[test]
    fn test_from_json_rejects_bad_model() {
        let json = r#"{"transcripts": [{
            "gene": "G", "transcript_id": "T1", "chrom": "1", "strand": "+",
            "tx": [1, 10], "cds": [1, 10], "exons": []
        }]}"#;
        assert!(matches!(
            MockProvider::from_json_str(json),
            Err(FerroError::InvalidTranscript { .. })
        ));
    }
}
