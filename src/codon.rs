//! Genetic codes and codon translation.
//!
//! Two tables are provided: the standard nuclear code and the vertebrate
//! mitochondrial code. Translation never fails; anything that is not a
//! well-formed `ACGT` triplet translates to the unknown residue `"?"`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Chromosome names that select the mitochondrial code.
pub const MITOCHONDRIAL_CHROMOSOMES: [&str; 3] = ["MT", "chrM", "M"];

/// Residue name used for codons that cannot be translated.
pub const UNKNOWN_RESIDUE: &str = "?";

/// A single nucleotide base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    /// Parse a base from a character.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'T' => Some(Base::T),
            _ => None,
        }
    }

    /// Convert to character.
    pub fn to_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A codon (three nucleotides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codon([Base; 3]);

impl Codon {
    /// Create a new codon from three bases.
    pub fn new(b1: Base, b2: Base, b3: Base) -> Self {
        Self([b1, b2, b3])
    }

    /// Parse a codon from a string. `N` and other letters are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let b1 = Base::from_char(chars.next()?)?;
        let b2 = Base::from_char(chars.next()?)?;
        let b3 = Base::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self([b1, b2, b3]))
    }

    /// Get the three bases.
    pub fn bases(&self) -> &[Base; 3] {
        &self.0
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Amino acids by three-letter code, with `End` standing for a stop codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    End,
}

impl AminoAcid {
    /// Three-letter name as used in amino-acid change strings.
    pub fn name(&self) -> &'static str {
        match self {
            AminoAcid::Ala => "Ala",
            AminoAcid::Arg => "Arg",
            AminoAcid::Asn => "Asn",
            AminoAcid::Asp => "Asp",
            AminoAcid::Cys => "Cys",
            AminoAcid::Gln => "Gln",
            AminoAcid::Glu => "Glu",
            AminoAcid::Gly => "Gly",
            AminoAcid::His => "His",
            AminoAcid::Ile => "Ile",
            AminoAcid::Leu => "Leu",
            AminoAcid::Lys => "Lys",
            AminoAcid::Met => "Met",
            AminoAcid::Phe => "Phe",
            AminoAcid::Pro => "Pro",
            AminoAcid::Ser => "Ser",
            AminoAcid::Thr => "Thr",
            AminoAcid::Trp => "Trp",
            AminoAcid::Tyr => "Tyr",
            AminoAcid::Val => "Val",
            AminoAcid::End => "End",
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a translated residue, `None` being the unknown residue `"?"`.
pub fn residue_name(residue: Option<AminoAcid>) -> &'static str {
    residue.map_or(UNKNOWN_RESIDUE, |aa| aa.name())
}

/// Which genetic code a table implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneticCode {
    Nuclear,
    Mitochondrial,
}

impl GeneticCode {
    /// The code used for a chromosome.
    pub fn for_chromosome(chrom: &str) -> Self {
        if is_mitochondrial(chrom) {
            GeneticCode::Mitochondrial
        } else {
            GeneticCode::Nuclear
        }
    }
}

/// Whether a chromosome name denotes the mitochondrial genome.
pub fn is_mitochondrial(chrom: &str) -> bool {
    MITOCHONDRIAL_CHROMOSOMES.contains(&chrom)
}

const STANDARD_CODE: &[(&str, AminoAcid)] = &[
    ("TTT", AminoAcid::Phe),
    ("TTC", AminoAcid::Phe),
    ("TTA", AminoAcid::Leu),
    ("TTG", AminoAcid::Leu),
    ("CTT", AminoAcid::Leu),
    ("CTC", AminoAcid::Leu),
    ("CTA", AminoAcid::Leu),
    ("CTG", AminoAcid::Leu),
    ("ATT", AminoAcid::Ile),
    ("ATC", AminoAcid::Ile),
    ("ATA", AminoAcid::Ile),
    ("ATG", AminoAcid::Met),
    ("GTT", AminoAcid::Val),
    ("GTC", AminoAcid::Val),
    ("GTA", AminoAcid::Val),
    ("GTG", AminoAcid::Val),
    ("TCT", AminoAcid::Ser),
    ("TCC", AminoAcid::Ser),
    ("TCA", AminoAcid::Ser),
    ("TCG", AminoAcid::Ser),
    ("AGT", AminoAcid::Ser),
    ("AGC", AminoAcid::Ser),
    ("CCT", AminoAcid::Pro),
    ("CCC", AminoAcid::Pro),
    ("CCA", AminoAcid::Pro),
    ("CCG", AminoAcid::Pro),
    ("ACT", AminoAcid::Thr),
    ("ACC", AminoAcid::Thr),
    ("ACA", AminoAcid::Thr),
    ("ACG", AminoAcid::Thr),
    ("GCT", AminoAcid::Ala),
    ("GCC", AminoAcid::Ala),
    ("GCA", AminoAcid::Ala),
    ("GCG", AminoAcid::Ala),
    ("TAT", AminoAcid::Tyr),
    ("TAC", AminoAcid::Tyr),
    ("TAA", AminoAcid::End),
    ("TAG", AminoAcid::End),
    ("TGA", AminoAcid::End),
    ("CAT", AminoAcid::His),
    ("CAC", AminoAcid::His),
    ("CAA", AminoAcid::Gln),
    ("CAG", AminoAcid::Gln),
    ("AAT", AminoAcid::Asn),
    ("AAC", AminoAcid::Asn),
    ("AAA", AminoAcid::Lys),
    ("AAG", AminoAcid::Lys),
    ("GAT", AminoAcid::Asp),
    ("GAC", AminoAcid::Asp),
    ("GAA", AminoAcid::Glu),
    ("GAG", AminoAcid::Glu),
    ("TGT", AminoAcid::Cys),
    ("TGC", AminoAcid::Cys),
    ("TGG", AminoAcid::Trp),
    ("CGT", AminoAcid::Arg),
    ("CGC", AminoAcid::Arg),
    ("CGA", AminoAcid::Arg),
    ("CGG", AminoAcid::Arg),
    ("AGA", AminoAcid::Arg),
    ("AGG", AminoAcid::Arg),
    ("GGT", AminoAcid::Gly),
    ("GGC", AminoAcid::Gly),
    ("GGA", AminoAcid::Gly),
    ("GGG", AminoAcid::Gly),
];

// Mitochondrial deviations from the standard code.
const MITOCHONDRIAL_OVERRIDES: &[(&str, AminoAcid)] = &[
    ("TGA", AminoAcid::Trp),
    ("ATA", AminoAcid::Met),
];

static NUCLEAR: Lazy<CodonTable> =
    Lazy::new(|| CodonTable::build(GeneticCode::Nuclear, &[], &["ATG"]));

static MITOCHONDRIAL: Lazy<CodonTable> = Lazy::new(|| {
    CodonTable::build(
        GeneticCode::Mitochondrial,
        MITOCHONDRIAL_OVERRIDES,
        &["ATG", "ATA"],
    )
});

/// A genetic code table.
#[derive(Debug, Clone)]
pub struct CodonTable {
    code: GeneticCode,
    /// Codon to amino acid mapping, stops included as `End`.
    codon_to_aa: HashMap<Codon, AminoAcid>,
    /// Stop codons.
    stop_codons: Vec<Codon>,
    /// Start codon(s).
    start_codons: Vec<Codon>,
}

impl CodonTable {
    fn build(code: GeneticCode, overrides: &[(&str, AminoAcid)], starts: &[&str]) -> Self {
        let mut codon_to_aa = HashMap::with_capacity(64);
        for (codon_str, aa) in STANDARD_CODE.iter().chain(overrides) {
            if let Some(codon) = Codon::parse(codon_str) {
                codon_to_aa.insert(codon, *aa);
            }
        }

        let mut stop_codons: Vec<Codon> = codon_to_aa
            .iter()
            .filter(|(_, aa)| **aa == AminoAcid::End)
            .map(|(codon, _)| *codon)
            .collect();
        stop_codons.sort_by_key(|c| c.to_string());

        let start_codons: Vec<Codon> = starts.iter().filter_map(|s| Codon::parse(s)).collect();
        log::debug!(
            "built {:?} codon table: {} codons, {} stops, {} starts",
            code,
            codon_to_aa.len(),
            stop_codons.len(),
            start_codons.len()
        );

        Self {
            code,
            codon_to_aa,
            stop_codons,
            start_codons,
        }
    }

    /// The standard nuclear genetic code.
    pub fn nuclear() -> &'static CodonTable {
        &NUCLEAR
    }

    /// The vertebrate mitochondrial genetic code.
    pub fn mitochondrial() -> &'static CodonTable {
        &MITOCHONDRIAL
    }

    /// The table to use for a chromosome.
    pub fn for_chromosome(chrom: &str) -> &'static CodonTable {
        match GeneticCode::for_chromosome(chrom) {
            GeneticCode::Nuclear => Self::nuclear(),
            GeneticCode::Mitochondrial => Self::mitochondrial(),
        }
    }

    /// Which code this table implements.
    pub fn code(&self) -> GeneticCode {
        self.code
    }

    /// Translate a codon; `None` for anything that is not a known triplet.
    pub fn translate(&self, codon: &str) -> Option<AminoAcid> {
        match Codon::parse(codon) {
            Some(parsed) => self.codon_to_aa.get(&parsed).copied(),
            None => {
                if codon.chars().count() == 3 {
                    log::warn!("codon '{}' contains a non-nucleotide letter", codon);
                }
                None
            }
        }
    }

    /// Translate a codon to its residue name (`"?"` when untranslatable).
    pub fn translate_name(&self, codon: &str) -> &'static str {
        residue_name(self.translate(codon))
    }

    /// Check if a codon is a stop codon.
    pub fn is_stop(&self, codon: &str) -> bool {
        Codon::parse(codon).is_some_and(|c| self.stop_codons.contains(&c))
    }

    /// Check if a codon is a start codon.
    pub fn is_start(&self, codon: &str) -> bool {
        Codon::parse(codon).is_some_and(|c| self.start_codons.contains(&c))
    }

    /// Stop codons of this table.
    pub fn stop_codons(&self) -> &[Codon] {
        &self.stop_codons
    }

    /// Start codons of this table.
    pub fn start_codons(&self) -> &[Codon] {
        &self.start_codons
    }
}

/// Complement a nucleotide sequence (no reversal). `N` maps to `N`;
/// any other letter is kept as-is.
pub fn complement(sequence: &str) -> String {
    sequence
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'A' => 'T',
            'T' => 'A',
            'G' => 'C',
            'C' => 'G',
            other => other,
        })
        .collect()
}

/// Reverse complement a nucleotide sequence.
pub fn reverse_complement(sequence: &str) -> String {
    complement(sequence).chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codon_parse() {
        let codon = Codon::parse("atg").unwrap();
        assert_eq!(codon.to_string(), "ATG");
        assert!(Codon::parse("AT").is_none());
        assert!(Codon::parse("ATGC").is_none());
        assert!(Codon::parse("ANG").is_none());
    }

    #[test]
    fn test_nuclear_table() {
        let table = CodonTable::nuclear();
        assert_eq!(table.code(), GeneticCode::Nuclear);
        assert_eq!(table.translate("ATG"), Some(AminoAcid::Met));
        assert_eq!(table.translate("TGA"), Some(AminoAcid::End));
        assert_eq!(table.translate("ATA"), Some(AminoAcid::Ile));
        assert_eq!(table.translate("AGA"), Some(AminoAcid::Arg));
        assert_eq!(table.stop_codons().len(), 3);
        assert!(table.is_stop("TAG"));
        assert!(table.is_stop("TAA"));
        assert!(table.is_start("ATG"));
        assert!(!table.is_start("ATA"));
    }

    #[test]
    fn test_mitochondrial_table() {
        let table = CodonTable::mitochondrial();
        assert_eq!(table.translate("TGA"), Some(AminoAcid::Trp));
        assert_eq!(table.translate("ATA"), Some(AminoAcid::Met));
        assert_eq!(table.translate("ATT"), Some(AminoAcid::Ile));
        assert!(!table.is_stop("TGA"));
        assert!(table.is_stop("TAA"));
        assert!(table.is_stop("TAG"));
        assert!(table.is_start("ATA"));
        assert_eq!(table.stop_codons().len(), 2);
    }

    #[test]
    fn test_unknown_codons() {
        let table = CodonTable::nuclear();
        assert_eq!(table.translate_name("ANG"), "?");
        assert_eq!(table.translate_name("AT"), "?");
        assert_eq!(table.translate_name("XYZ"), "?");
        assert_eq!(table.translate_name("aag"), "Lys");
        assert!(!table.is_stop("NNN"));
    }

    #[test]
    fn test_table_selection() {
        for chrom in ["MT", "chrM", "M"] {
            assert_eq!(
                CodonTable::for_chromosome(chrom).code(),
                GeneticCode::Mitochondrial
            );
        }
        assert_eq!(CodonTable::for_chromosome("chrMT").code(), GeneticCode::Nuclear);
        assert_eq!(CodonTable::for_chromosome("1").code(), GeneticCode::Nuclear);
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ATGC"), "GCAT");
        assert_eq!(reverse_complement("aNt"), "ANT");
        assert_eq!(complement("ACGT"), "TGCA");
    }

    #[test]
    fn test_all_64_codons_translate() {
        let bases = ['A', 'C', 'G', 'T'];
        for table in [CodonTable::nuclear(), CodonTable::mitochondrial()] {
            for a in bases {
                for b in bases {
                    for c in bases {
                        let codon: String = [a, b, c].iter().collect();
                        assert!(table.translate(&codon).is_some(), "{}", codon);
                    }
                }
            }
        }
    }
}
