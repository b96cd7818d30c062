//! Per-transcript annotation request
//!
//! Bundles a variant with one transcript model and answers the geometric
//! questions the effect classifier asks: where the variant sits in the
//! coding sequence, which codons it touches, and what they translate to.
//!
//! Coordinates are handled as `i64` so distances can go negative when a
//! variant crosses a boundary.

use crate::codon::{reverse_complement, CodonTable, UNKNOWN_RESIDUE};
use crate::effect::{Effect, EffectKind};
use crate::error::FerroError;
use crate::reference::{Region, SequenceAccessor, Strand, TranscriptModel};
use crate::variant::{VariantKind, VariantSpec};
use once_cell::unsync::OnceCell;

/// Bases needed to complete the last codon of a stretch of `length` bases
pub fn fill_to_codon(length: i64) -> i64 {
    (3 - length.rem_euclid(3)) % 3
}

/// A variant paired with one transcript
pub struct AnnotationRequest<'a, S: SequenceAccessor + ?Sized> {
    genome: &'a S,
    pub code: &'static CodonTable,
    pub promoter_len: u64,
    pub variant: &'a VariantSpec,
    pub transcript: &'a TranscriptModel,
    cds_regions: Vec<Region>,
    amino_acids: OnceCell<(Vec<String>, Vec<String>)>,
}

impl<'a, S: SequenceAccessor + ?Sized> AnnotationRequest<'a, S> {
    pub fn new(
        genome: &'a S,
        code: &'static CodonTable,
        promoter_len: u64,
        variant: &'a VariantSpec,
        transcript: &'a TranscriptModel,
    ) -> Self {
        Self {
            genome,
            code,
            promoter_len,
            variant,
            transcript,
            cds_regions: transcript.cds_regions(),
            amino_acids: OnceCell::new(),
        }
    }

    pub fn strand(&self) -> Strand {
        self.transcript.strand
    }

    pub fn is_insertion(&self) -> bool {
        self.variant.kind == VariantKind::Insertion
    }

    /// First affected base
    pub fn pos(&self) -> i64 {
        self.variant.pos as i64
    }

    /// Last affected base (`pos` for insertions)
    pub fn last(&self) -> i64 {
        self.variant.corrected_last() as i64
    }

    /// First base after the replaced reference
    pub fn ref_position_last(&self) -> i64 {
        self.variant.ref_position_last() as i64
    }

    pub fn ref_len(&self) -> i64 {
        self.variant.ref_len() as i64
    }

    pub fn alt_len(&self) -> i64 {
        self.variant.alt_seq().len() as i64
    }

    pub fn cds_start(&self) -> i64 {
        self.transcript.cds.0 as i64
    }

    pub fn cds_end(&self) -> i64 {
        self.transcript.cds.1 as i64
    }

    /// Coding pieces of the exons, in genomic order
    pub fn cds_regions(&self) -> &[Region] {
        &self.cds_regions
    }

    fn exon_bounds(&self, index: usize) -> (i64, i64) {
        let exon = &self.transcript.exons[index];
        (exon.start as i64, exon.stop as i64)
    }

    fn first_exon_start(&self) -> i64 {
        self.transcript.exonic_start() as i64
    }

    fn last_exon_stop(&self) -> i64 {
        self.transcript.exonic_stop() as i64
    }

    fn clamp_in_cds(&self, position: i64) -> i64 {
        position.clamp(self.cds_start(), self.cds_end().max(self.cds_start()))
    }

    /// Exonic bases between `start` and `end`, walking the exons
    fn exonic_distance(&self, start: i64, end: i64) -> i64 {
        let mut length = 0;
        for exon in &self.transcript.exons {
            let (s, e) = (exon.start as i64, exon.stop as i64);
            if s <= start && start <= e {
                if s <= end && end <= e {
                    return end - start;
                }
                length = e - start + 1;
            } else {
                length += e - s + 1;
            }
            if s <= end && end <= e {
                length -= e - end + 1;
                break;
            }
        }
        length
    }

    /// Length of the spliced transcript
    pub fn exonic_length(&self) -> i64 {
        self.exonic_distance(self.first_exon_start(), self.last_exon_stop()) + 1
    }

    /// Position of the variant in the spliced transcript (genomic direction)
    pub fn exonic_position(&self) -> i64 {
        self.exonic_distance(self.first_exon_start(), self.pos()) + 1
    }

    /// Coding bases between the 5' end of the CDS and `position`
    pub fn coding_nucleotide_position(&self, position: i64) -> i64 {
        let mut length = 0;
        match self.strand() {
            Strand::Plus => {
                for region in &self.cds_regions {
                    let (s, e) = (region.start as i64, region.stop as i64);
                    if s - 1 <= position && position <= e + 1 {
                        length += position - s;
                        break;
                    }
                    length += e - s + 1;
                }
            }
            Strand::Minus => {
                for region in self.cds_regions.iter().rev() {
                    let (s, e) = (region.start as i64, region.stop as i64);
                    if s - 1 <= position && position <= e + 1 {
                        length += e - position;
                        break;
                    }
                    length += e - s + 1;
                }
            }
        }
        log::trace!("coding nucleotide position {} -> {}", position, length);
        length
    }

    /// First and last amino acid touched by the variant
    pub fn protein_position(&self) -> (u64, u64) {
        let start = self.clamp_in_cds(self.pos());
        let end = self.clamp_in_cds(self.ref_position_last() - 1).max(start);
        let start_cp = self.coding_nucleotide_position(start);
        let end_cp = self.coding_nucleotide_position(end);
        let (first, last) = match self.strand() {
            Strand::Plus => (start_cp, end_cp),
            Strand::Minus => (end_cp, start_cp),
        };
        (
            (first.max(0) / 3 + 1) as u64,
            (last.max(0) / 3 + 1) as u64,
        )
    }

    /// Protein length in amino acids, stop codon excluded
    pub fn protein_length(&self) -> u64 {
        let end = match self.strand() {
            Strand::Plus => self.cds_end(),
            Strand::Minus => self.cds_start(),
        };
        (self.coding_nucleotide_position(end).max(0) / 3) as u64
    }

    /// Amino acid at a genomic position, `None` outside the CDS
    pub fn protein_position_for(&self, position: i64) -> Option<u64> {
        if position < self.cds_start() || position > self.cds_end() {
            return None;
        }
        Some((self.coding_nucleotide_position(position) / 3 + 1) as u64)
    }

    fn sequence(&self, start: i64, end: i64) -> Result<String, FerroError> {
        if end < start || end < 1 {
            return Ok(String::new());
        }
        self.genome
            .get(&self.transcript.chrom, start.max(1) as u64, end as u64)
    }

    /// Index of the exon holding `pos`, or of an exon adjacent to it
    pub fn exon_index_for(&self, pos: i64) -> Option<usize> {
        let mut close = None;
        for (i, exon) in self.transcript.exons.iter().enumerate() {
            let (s, e) = (exon.start as i64, exon.stop as i64);
            if s <= pos && pos <= e {
                return Some(i);
            }
            if s - 1 <= pos && pos <= e + 1 {
                close = Some(i);
            }
        }
        close
    }

    /// `length` spliced bases starting at `pos`, continuing into later exons
    fn coding_right(
        &self,
        pos: i64,
        mut length: i64,
        mut index: usize,
    ) -> Result<String, FerroError> {
        if length <= 0 {
            return Ok(String::new());
        }
        let last_stop = self.last_exon_stop();
        if pos > last_stop {
            return self.sequence(pos, pos + length - 1);
        }

        let mut out = String::new();
        let mut from = Some(pos);
        while length > 0 {
            if index >= self.transcript.exons.len() {
                out.push_str(&self.sequence(last_stop + 1, last_stop + length)?);
                break;
            }
            let (start, stop) = self.exon_bounds(index);
            let begin = from.unwrap_or(start);
            let seq = self.sequence(begin, (begin + length - 1).min(stop))?;
            length -= seq.len() as i64;
            out.push_str(&seq);
            from = None;
            index += 1;
        }
        Ok(out)
    }

    /// `length` spliced bases ending at `pos`, continuing into earlier exons
    fn coding_left(
        &self,
        pos: i64,
        mut length: i64,
        mut index: usize,
    ) -> Result<String, FerroError> {
        if length <= 0 {
            return Ok(String::new());
        }
        if pos < self.first_exon_start() {
            return self.sequence(pos - length + 1, pos);
        }

        let mut pieces = Vec::new();
        let mut to = Some(pos);
        loop {
            let Some(exon) = self.transcript.exons.get(index) else {
                break;
            };
            let (start, stop) = (exon.start as i64, exon.stop as i64);
            let end = to.unwrap_or(stop);
            let seq = self.sequence((end - length + 1).max(start), end)?;
            length -= seq.len() as i64;
            pieces.push(seq);
            if index == 0 {
                if length > 0 {
                    pieces.push(self.sequence(start - length, start - 1)?);
                }
                break;
            }
            if length <= 0 {
                break;
            }
            index -= 1;
            to = None;
        }
        pieces.reverse();
        Ok(pieces.concat())
    }

    /// Reading frame of `pos` inside exon `index`
    pub fn frame(&self, pos: i64, index: usize) -> i64 {
        let exon = &self.transcript.exons[index];
        let frame = exon.frame.unwrap_or(0) as i64;
        let (start, stop) = (exon.start as i64, exon.stop as i64);
        match self.strand() {
            Strand::Plus => {
                if stop < self.cds_start() {
                    log::warn!(
                        "{}: exon {}-{} ends before the CDS, frame undefined",
                        self.transcript.transcript_id,
                        start,
                        stop
                    );
                    return 0;
                }
                (pos - self.cds_start().max(start) + frame).rem_euclid(3)
            }
            Strand::Minus => {
                if start > self.cds_end() {
                    log::warn!(
                        "{}: exon {}-{} starts after the CDS, frame undefined",
                        self.transcript.transcript_id,
                        start,
                        stop
                    );
                    return 0;
                }
                (self.cds_end().min(stop) - pos + frame).rem_euclid(3)
            }
        }
    }

    /// Reference and alternate codons spanning the variant, in genomic order
    pub fn codons(&self) -> Result<(String, String), FerroError> {
        match self.strand() {
            Strand::Plus => self.codons_plus(),
            Strand::Minus => self.codons_minus(),
        }
    }

    fn codons_plus(&self) -> Result<(String, String), FerroError> {
        let pos = self.cds_start().max(self.pos());
        let Some(index) = self.exon_index_for(pos) else {
            log::warn!("{}: no exon near {}", self.transcript.transcript_id, pos);
            return Ok((String::new(), String::new()));
        };
        let frame = self.frame(pos, index);
        let ref_len = self.ref_len();
        let length = ref_len + fill_to_codon(ref_len + frame);

        let before = self.coding_left(pos - 1, frame, index)?;
        let ref_codons = format!("{}{}", before, self.coding_right(pos, length, index)?);

        let alt = self.variant.alt_seq();
        let alt_fill = fill_to_codon(alt.len() as i64 + frame);
        let after = self.coding_right(self.pos() + ref_len, alt_fill, index)?;
        let alt_codons = format!("{}{}{}", before, alt, after);

        log::debug!("ref codons={} alt codons={}", ref_codons, alt_codons);
        Ok((ref_codons, alt_codons))
    }

    fn codons_minus(&self) -> Result<(String, String), FerroError> {
        let pos = self.pos().max(self.cds_start());
        let last = self.pos() + self.ref_len() - 1;
        if pos > last + 1 {
            return Ok((String::new(), String::new()));
        }
        let Some(index) = self.exon_index_for(pos) else {
            log::warn!("{}: no exon near {}", self.transcript.transcript_id, pos);
            return Ok((String::new(), String::new()));
        };
        let frame = self.frame(last, index);
        let span = last - pos + 1;
        let length = span + fill_to_codon(span + frame);

        let before = self.coding_left(last, length, index)?;
        let after = self.coding_right(last + 1, frame, index)?;
        let ref_codons = format!("{}{}", before, after);

        let alt = self.variant.alt_seq();
        let alt_fill = fill_to_codon(alt.len() as i64 + frame);
        let alt_codons = format!(
            "{}{}{}",
            self.coding_left(self.pos() - 1, alt_fill, index)?,
            alt,
            after
        );

        log::debug!("ref codons={} alt codons={}", ref_codons, alt_codons);
        Ok((ref_codons, alt_codons))
    }

    fn translate(&self, codon: &str) -> String {
        if codon.len() != 3 {
            return UNKNOWN_RESIDUE.to_string();
        }
        if let Some(bad) = codon
            .chars()
            .find(|c| !matches!(c, 'A' | 'C' | 'G' | 'T' | 'N'))
        {
            log::warn!("codon {} contains '{}'", codon, bad);
            return UNKNOWN_RESIDUE.to_string();
        }
        self.code.translate_name(codon).to_string()
    }

    fn residues(&self, codons: &str) -> Vec<String> {
        let bytes = codons.as_bytes();
        match self.strand() {
            Strand::Plus => bytes
                .chunks(3)
                .map(|chunk| self.translate(&String::from_utf8_lossy(chunk)))
                .collect(),
            Strand::Minus => bytes
                .rchunks(3)
                .map(|chunk| self.translate(&reverse_complement(&String::from_utf8_lossy(chunk))))
                .collect(),
        }
    }

    /// Reference and alternate residues in transcript order
    pub fn amino_acids(&self) -> Result<&(Vec<String>, Vec<String>), FerroError> {
        self.amino_acids.get_or_try_init(|| {
            let (ref_codons, alt_codons) = self.codons()?;
            Ok((self.residues(&ref_codons), self.residues(&alt_codons)))
        })
    }

    /// Check a codon (genomic orientation) against the transcript's start codon
    pub fn in_start_codons(&self, codon: &str) -> Result<bool, FerroError> {
        let (start, end, oriented) = match self.strand() {
            Strand::Plus => (self.cds_start(), self.cds_start() + 2, codon.to_string()),
            Strand::Minus => (self.cds_end() - 2, self.cds_end(), reverse_complement(codon)),
        };
        let reference = self.sequence(start, end)?;
        Ok(codon == reference || self.code.is_start(&oriented))
    }

    /// Check if the reference stop codon is a real stop codon
    pub fn has_stop_codon(&self) -> Result<bool, FerroError> {
        let codon = match self.strand() {
            Strand::Plus => self.sequence(self.cds_end() - 2, self.cds_end())?,
            Strand::Minus => {
                reverse_complement(&self.sequence(self.cds_start(), self.cds_start() + 2)?)
            }
        };
        Ok(self.code.is_stop(&codon))
    }

    /// Check if the variant overlaps the 3 bases of the start codon
    pub fn is_start_codon_affected(&self) -> bool {
        match self.strand() {
            Strand::Plus => self.touches_cds_head(),
            Strand::Minus => self.touches_cds_tail(),
        }
    }

    /// Check if the variant overlaps the 3 bases of the stop codon
    pub fn is_stop_codon_affected(&self) -> bool {
        match self.strand() {
            Strand::Plus => self.touches_cds_tail(),
            Strand::Minus => self.touches_cds_head(),
        }
    }

    fn touches_cds_head(&self) -> bool {
        self.pos() <= self.cds_start() + 2 && self.cds_start() <= self.last()
    }

    fn touches_cds_tail(&self) -> bool {
        self.pos() <= self.cds_end() && self.cds_end() - 2 <= self.last()
    }

    /// Check if any exon overlaps the variant
    pub fn overlaps_exon(&self) -> bool {
        let (pos, last) = (self.variant.pos, self.variant.corrected_last());
        self.transcript.exons.iter().any(|e| e.overlaps(pos, last))
    }

    /// Effect naming the transcript, with mRNA length and position
    pub fn effect(&self, kind: EffectKind) -> Effect {
        Effect {
            mrna_length: Some(self.exonic_length().max(0) as u64),
            mrna_position: Some(self.exonic_position()),
            ..Effect::for_transcript(kind, self.transcript)
        }
    }

    /// [`Self::effect`] plus the protein length for coding transcripts
    pub fn effect_with_prot_length(&self, kind: EffectKind) -> Effect {
        Effect {
            prot_length: self.transcript.is_coding().then(|| self.protein_length()),
            ..self.effect(kind)
        }
    }

    /// [`Self::effect_with_prot_length`] plus the first affected residue
    pub fn effect_with_prot_pos(&self, kind: EffectKind) -> Effect {
        Effect {
            prot_pos: Some(self.protein_position().0),
            ..self.effect_with_prot_length(kind)
        }
    }

    /// [`Self::effect_with_prot_pos`] plus the residue change
    pub fn effect_with_aa_change(&self, kind: EffectKind) -> Result<Effect, FerroError> {
        let (ref_aa, alt_aa) = self.amino_acids()?;
        Ok(Effect {
            aa_change: Some(format!("{}->{}", ref_aa.join(","), alt_aa.join(","))),
            ref_aa: Some(ref_aa.clone()),
            alt_aa: Some(alt_aa.clone()),
            ..self.effect_with_prot_pos(kind)
        })
    }

    /// Effect for a variant inside the intron bounded by exonic bases
    /// `start` and `end`
    ///
    /// `index` is the 1-based intron number counted left to right in genomic
    /// order and `how_many` the number of introns counted.
    pub fn intronic_effect(
        &self,
        kind: EffectKind,
        start: i64,
        end: i64,
        index: u64,
        how_many: u64,
    ) -> Effect {
        let dist_left = self.pos() - start - 1;
        let dist_right = end - self.ref_position_last();
        let (acceptor, donor, which) = match self.strand() {
            Strand::Plus => (dist_right, dist_left, index),
            Strand::Minus => (dist_left, dist_right, how_many + 1 - index),
        };
        Effect {
            dist_from_coding: Some(dist_left.min(dist_right)),
            how_many_introns: Some(how_many),
            intron_length: Some(end - start - 1),
            dist_from_acceptor: Some(acceptor),
            dist_from_donor: Some(donor),
            which_intron: Some(which),
            ..self.effect_with_prot_length(kind)
        }
    }

    /// [`Self::intronic_effect`] plus the residue next to the intron
    pub fn coding_intronic_effect(
        &self,
        kind: EffectKind,
        start: i64,
        end: i64,
        index: u64,
        how_many: u64,
    ) -> Effect {
        let prot_pos = match self.strand() {
            Strand::Plus => self.protein_position_for(end),
            Strand::Minus => self.protein_position_for(start),
        };
        Effect {
            prot_pos,
            ..self.intronic_effect(kind, start, end, index, how_many)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::MockProvider;

    fn with_request<F: FnOnce(&AnnotationRequest<MockProvider>)>(
        provider: &MockProvider,
        tx: &str,
        variant: &VariantSpec,
        f: F,
    ) {
        let tm = provider
            .transcripts()
            .find(|tm| tm.transcript_id == tx)
            .unwrap();
        let request = AnnotationRequest::new(provider, CodonTable::nuclear(), 0, variant, tm);
        f(&request);
    }

    #[test]
    fn test_fill_to_codon() {
        assert_eq!(fill_to_codon(0), 0);
        assert_eq!(fill_to_codon(1), 2);
        assert_eq!(fill_to_codon(2), 1);
        assert_eq!(fill_to_codon(3), 0);
        assert_eq!(fill_to_codon(7), 2);
    }

    #[test]
    fn test_plus_positions() {
        let provider = MockProvider::with_test_data();
        let v = VariantSpec::from_alleles("1", 66, "A", "G");
        with_request(&provider, "TXP1", &v, |r| {
            // 10 coding bases in exon 1, then 61..=66.
            assert_eq!(r.coding_nucleotide_position(66), 15);
            assert_eq!(r.protein_position(), (6, 6));
            assert_eq!(r.protein_length(), 15);
            assert_eq!(r.exonic_length(), 90);
            assert_eq!(r.exonic_position(), 26);
            assert_eq!(r.protein_position_for(61), Some(4));
            assert_eq!(r.protein_position_for(20), None);
        });
    }

    #[test]
    fn test_plus_codons_across_exon_boundary() {
        let provider = MockProvider::with_test_data();
        // 61 is the second base of codon GGG (30, 61, 62).
        let v = VariantSpec::from_alleles("1", 61, "G", "A");
        with_request(&provider, "TXP1", &v, |r| {
            assert_eq!(r.frame(61, 1), 1);
            let (ref_codons, alt_codons) = r.codons().unwrap();
            assert_eq!(ref_codons, "GGG");
            assert_eq!(alt_codons, "GAG");
            let (ref_aa, alt_aa) = r.amino_acids().unwrap();
            assert_eq!(ref_aa, &vec!["Gly".to_string()]);
            assert_eq!(alt_aa, &vec!["Glu".to_string()]);
        });
    }

    #[test]
    fn test_minus_codons() {
        let provider = MockProvider::with_test_data();
        // Codon 2 of GENEM (CGT) sits at 295..=297, reverse strand ACG.
        let v = VariantSpec::from_alleles("1", 296, "C", "T");
        with_request(&provider, "TXM1", &v, |r| {
            assert_eq!(r.protein_position(), (2, 2));
            assert_eq!(r.protein_length(), 14);
            let (ref_codons, alt_codons) = r.codons().unwrap();
            assert_eq!(ref_codons, "ACG");
            assert_eq!(alt_codons, "ATG");
            let (ref_aa, alt_aa) = r.amino_acids().unwrap();
            assert_eq!(ref_aa, &vec!["Arg".to_string()]);
            assert_eq!(alt_aa, &vec!["His".to_string()]);
        });
    }

    #[test]
    fn test_start_and_stop_affected() {
        let provider = MockProvider::with_test_data();
        let v = VariantSpec::from_alleles("1", 22, "T", "C");
        with_request(&provider, "TXP1", &v, |r| {
            assert!(r.is_start_codon_affected());
            assert!(!r.is_stop_codon_affected());
            assert!(r.has_stop_codon().unwrap());
            assert!(r.in_start_codons("ATG").unwrap());
            assert!(!r.in_start_codons("ACG").unwrap());
        });
        let v = VariantSpec::from_alleles("1", 217, "C", "T");
        with_request(&provider, "TXM1", &v, |r| {
            assert!(r.is_stop_codon_affected());
            assert!(!r.is_start_codon_affected());
            assert!(r.has_stop_codon().unwrap());
            assert!(r.in_start_codons("CAT").unwrap());
        });
    }

    #[test]
    fn test_intronic_effect_fields() {
        let provider = MockProvider::with_test_data();
        let v = VariantSpec::from_alleles("1", 40, "C", "A");
        with_request(&provider, "TXP1", &v, |r| {
            let e = r.coding_intronic_effect(EffectKind::Intron, 30, 61, 1, 2);
            assert_eq!(e.dist_from_donor, Some(9));
            assert_eq!(e.dist_from_acceptor, Some(20));
            assert_eq!(e.dist_from_coding, Some(9));
            assert_eq!(e.intron_length, Some(30));
            assert_eq!(e.which_intron, Some(1));
            assert_eq!(e.how_many_introns, Some(2));
            assert_eq!(e.prot_pos, Some(4));
        });
    }
}
